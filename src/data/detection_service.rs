//! Thin orchestrator for the detection extraction pipeline: resolve
//! partition hints, fetch raw rows, enrich. The public entry point for all
//! detection data access — the resulting rows are the single source of
//! truth every widget processor consumes downstream.

use std::collections::{HashMap, BTreeMap};

use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::EnrichedDetection;

use super::{detection_repository, enrichment, partition_manager, table_resolver};

pub async fn get_enriched_detections(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    use_partition_hints: bool,
    cache: &MetadataCache,
) -> AppResult<Vec<EnrichedDetection>> {
    if line_ids.is_empty() {
        return Ok(Vec::new());
    }

    let hint = if use_partition_hints { resolve_partition_hint(cleaned) } else { String::new() };

    let raw = detection_repository::fetch_detections_multi_line(pool, line_ids, cleaned, &hint, cache).await?;

    if raw.is_empty() {
        tracing::info!("no detections found for given filters");
        return Ok(Vec::new());
    }

    let enriched = enrichment::enrich_detections(raw, cache)?;
    tracing::info!("enriched {} detections for {} lines", enriched.len(), line_ids.len());
    Ok(enriched)
}

pub struct DetectionCount {
    pub total: i64,
    pub per_line: HashMap<i64, i64>,
}

pub async fn get_detection_count(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cache: &MetadataCache,
) -> AppResult<DetectionCount> {
    let mut per_line = HashMap::new();
    let mut total = 0;

    for &line_id in line_ids {
        let Some(table_name) = table_resolver::detection_table(cache, line_id)? else {
            continue;
        };
        let count = detection_repository::count_detections(pool, &table_name, cleaned, "", cache).await?;
        per_line.insert(line_id, count);
        total += count;
    }

    Ok(DetectionCount { total, per_line })
}

pub struct DetectionSummary {
    pub total: usize,
    pub by_area_type: BTreeMap<String, usize>,
}

pub async fn get_detection_summary(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cache: &MetadataCache,
) -> AppResult<DetectionSummary> {
    let detections = get_enriched_detections(pool, line_ids, cleaned, true, cache).await?;

    let mut by_area_type: BTreeMap<String, usize> = BTreeMap::new();
    for d in &detections {
        if let Some(area_type) = &d.area_type {
            *by_area_type.entry(area_type.clone()).or_default() += 1;
        }
    }

    Ok(DetectionSummary { total: detections.len(), by_area_type })
}

fn resolve_partition_hint(cleaned: &HashMap<&'static str, ResolvedFilter>) -> String {
    let Some(daterange) = cleaned.get("daterange").map(|f| &f.value) else {
        return String::new();
    };
    let Some(obj) = daterange.as_object() else {
        return String::new();
    };

    let (Some(sd), Some(ed)) = (obj.get("start_date").and_then(|v| v.as_str()), obj.get("end_date").and_then(|v| v.as_str())) else {
        return String::new();
    };

    let (Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(sd, "%Y-%m-%d"),
        NaiveDate::parse_from_str(ed, "%Y-%m-%d"),
    ) else {
        return String::new();
    };

    partition_manager::partition_hint(start, end)
}
