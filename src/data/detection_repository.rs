//! Executes detection queries built by `query_builder` against the
//! `detection_line_{name}` tables. Returns raw rows with DB-native column
//! names — no metadata enrichment here (that's `enrichment`'s job).

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::Detection;

use super::bind::bind_query_as;
use super::query_builder::{self, DEFAULT_DETECTION_BATCH_SIZE};
use super::table_resolver;

/// Safety cap: absolute max rows across all pagination batches.
pub const MAX_TOTAL_ROWS: i64 = 2_000_000;

#[derive(sqlx::FromRow)]
struct DetectionRow {
    detection_id: i64,
    detected_at: NaiveDateTime,
    area_id: i64,
    product_id: i64,
}

/// Cursor-paginates a single detection table in batches, stopping once a
/// batch returns fewer rows than requested or the row cap is hit.
pub async fn fetch_detections(
    pool: &MySqlPool,
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    partition_hint: &str,
    max_rows: Option<i64>,
    cache: &MetadataCache,
) -> AppResult<Vec<Detection>> {
    let cap = max_rows.unwrap_or(MAX_TOTAL_ROWS);
    let mut out = Vec::new();
    let mut cursor_id = 0i64;

    while (out.len() as i64) < cap {
        let batch_limit = (cap - out.len() as i64).min(DEFAULT_DETECTION_BATCH_SIZE);

        let (sql, params) = query_builder::build_detection_query(
            table_name,
            cleaned,
            cursor_id,
            batch_limit,
            partition_hint,
            cache,
        )?;

        let query = bind_query_as(sqlx::query_as::<_, DetectionRow>(&sql), &params);
        let rows = match query.fetch_all(pool).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("detection query on {table_name} failed: {e}");
                break;
            }
        };

        if rows.is_empty() {
            break;
        }

        let batch_len = rows.len();
        cursor_id = rows.iter().map(|r| r.detection_id).max().unwrap_or(cursor_id);
        out.extend(rows.into_iter().map(|r| Detection {
            detection_id: r.detection_id,
            detected_at: r.detected_at,
            area_id: r.area_id,
            product_id: r.product_id,
            line_id: 0, // filled in by fetch_detections_multi_line
        }));

        if (batch_len as i64) < batch_limit {
            break;
        }
    }

    tracing::debug!("{table_name}: {} rows fetched", out.len());
    Ok(out)
}

/// Fetches detections for each line in `line_ids` and concatenates the
/// results, stamping each row with its originating `line_id`.
pub async fn fetch_detections_multi_line(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    partition_hint: &str,
    cache: &MetadataCache,
) -> AppResult<Vec<Detection>> {
    let mut all = Vec::new();

    for &line_id in line_ids {
        let Some(table_name) = table_resolver::detection_table(cache, line_id)? else {
            tracing::warn!("no detection table for line_id={line_id} — line not in cache?");
            continue;
        };

        let rows = fetch_detections(pool, &table_name, cleaned, partition_hint, None, cache).await?;
        all.extend(rows.into_iter().map(|mut r| {
            r.line_id = line_id;
            r
        }));
    }

    Ok(all)
}

pub async fn count_detections(
    pool: &MySqlPool,
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    partition_hint: &str,
    cache: &MetadataCache,
) -> AppResult<i64> {
    let (sql, params) = query_builder::build_detection_count_query(table_name, cleaned, partition_hint, cache)?;
    let query = bind_query_as::<(i64,)>(sqlx::query_as(&sql), &params);
    match query.fetch_optional(pool).await {
        Ok(Some((total,))) => Ok(total),
        Ok(None) => Ok(0),
        Err(e) => {
            tracing::error!("count query on {table_name} failed: {e}");
            Ok(0)
        }
    }
}
