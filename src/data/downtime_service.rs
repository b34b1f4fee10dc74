//! Orchestrates the full downtime pipeline: fetch DB-recorded events,
//! calculate gap-based events from detections, de-duplicate (DB wins),
//! merge, sort, and enrich with line metadata. The public entry point for
//! all downtime data access.

use std::collections::HashMap;

use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::{DowntimeEvent, DowntimeSource, EnrichedDetection};

use super::{downtime_calculator, downtime_repository};

/// Output: DB-recorded and gap-calculated events merged, de-duplicated,
/// sorted by `start_time`, each carrying a resolved `line_name`.
pub async fn get_downtime(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    detections: Option<&[EnrichedDetection]>,
    threshold_override: Option<i64>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEvent>> {
    let db_events = fetch_db_events(pool, line_ids, cleaned, cache).await?;

    let mut calc_events = match detections {
        Some(detections) if !detections.is_empty() => {
            downtime_calculator::calculate_gap_downtimes(detections, line_ids, threshold_override, cache)?
        }
        _ => Vec::new(),
    };

    if !calc_events.is_empty() && !db_events.is_empty() {
        calc_events = downtime_calculator::remove_overlapping(calc_events, &db_events);
    }

    let mut merged = db_events;
    merged.extend(calc_events);
    merged.sort_by_key(|e| e.start_time);

    enrich_line_names(&mut merged, cache)?;

    tracing::info!("{} total downtime events ({} merged)", merged.len(), line_ids.len());
    Ok(merged)
}

/// DB-recorded events only, no gap calculation.
pub async fn get_db_downtime_only(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEvent>> {
    let mut events = fetch_db_events(pool, line_ids, cleaned, cache).await?;
    enrich_line_names(&mut events, cache)?;
    Ok(events)
}

async fn fetch_db_events(
    pool: &MySqlPool,
    line_ids: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEvent>> {
    let rows = downtime_repository::fetch_downtime_multi_line(pool, line_ids, cleaned, cache).await?;

    Ok(rows
        .into_iter()
        .map(|r| DowntimeEvent {
            line_id: r.line_id,
            line_name: String::new(),
            start_time: r.start_time,
            end_time: r.end_time,
            duration: r.duration_seconds as f64,
            reason_code: r.reason_code,
            is_manual: r.is_manual,
            source: DowntimeSource::Db,
        })
        .collect())
}

fn enrich_line_names(events: &mut [DowntimeEvent], cache: &MetadataCache) -> AppResult<()> {
    for event in events.iter_mut() {
        event.line_name = cache
            .get_production_line(event.line_id)?
            .map(|l| l.line_name)
            .unwrap_or_else(|| format!("Line {}", event.line_id));
    }
    Ok(())
}
