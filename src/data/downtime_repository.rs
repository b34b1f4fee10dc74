//! Cursor-paginated fetch from `downtime_events_{line}` tables. Mirrors
//! `detection_repository`'s pattern but targets downtime tables.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::DowntimeEventRow;

use super::bind::bind_query_as;
use super::query_builder::{self, DEFAULT_DOWNTIME_BATCH_SIZE};
use super::table_resolver;

pub const MAX_TOTAL_ROWS: i64 = 100_000;

#[derive(sqlx::FromRow)]
struct DowntimeRow {
    event_id: i64,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    duration_seconds: i64,
    reason_code: Option<i64>,
    is_manual: bool,
}

pub async fn fetch_downtime(
    pool: &MySqlPool,
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    max_rows: Option<i64>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEventRow>> {
    let cap = max_rows.unwrap_or(MAX_TOTAL_ROWS);
    let mut out = Vec::new();
    let mut cursor_id = 0i64;

    while (out.len() as i64) < cap {
        let batch_limit = (cap - out.len() as i64).min(DEFAULT_DOWNTIME_BATCH_SIZE);

        let (sql, params) = query_builder::build_downtime_query(table_name, cleaned, cursor_id, batch_limit, cache)?;

        let query = bind_query_as(sqlx::query_as::<_, DowntimeRow>(&sql), &params);
        let rows = match query.fetch_all(pool).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!("downtime query on {table_name} failed: {e}");
                break;
            }
        };

        if rows.is_empty() {
            break;
        }

        let batch_len = rows.len();
        cursor_id = rows.iter().map(|r| r.event_id).max().unwrap_or(cursor_id);
        out.extend(rows.into_iter().map(|r| DowntimeEventRow {
            event_id: r.event_id,
            line_id: 0, // filled in by fetch_downtime_multi_line
            start_time: r.start_time,
            end_time: r.end_time,
            duration_seconds: r.duration_seconds,
            reason_code: r.reason_code,
            is_manual: r.is_manual,
        }));

        if (batch_len as i64) < batch_limit {
            break;
        }
    }

    tracing::info!("{table_name}: {} downtime events fetched", out.len());
    Ok(out)
}

pub async fn fetch_downtime_multi_line(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEventRow>> {
    let mut all = Vec::new();

    for &line_id in line_ids {
        let Some(table_name) = table_resolver::downtime_table(cache, line_id)? else {
            tracing::warn!("no downtime table for line_id={line_id}");
            continue;
        };

        let rows = fetch_downtime(pool, &table_name, cleaned, None, cache).await?;
        all.extend(rows.into_iter().map(|mut r| {
            r.line_id = line_id;
            r
        }));
    }

    Ok(all)
}
