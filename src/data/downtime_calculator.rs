//! Gap-based downtime detection: flags production stops by scanning the
//! gaps between consecutive detection timestamps per line.
//!
//! Merge rule: consecutive above-threshold gaps belong to the same
//! downtime event. A new event begins only after a below-threshold gap
//! (production must resume before a stop can close).

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::models::{DowntimeEvent, DowntimeSource, EnrichedDetection};

/// Scans `detections` (must carry `detected_at` and `line_id`) and emits a
/// calculated downtime event for every run of gaps exceeding the line's
/// threshold. Lines with `auto_detect_downtime = false` or a threshold
/// `<= 0` are skipped entirely.
pub fn calculate_gap_downtimes(
    detections: &[EnrichedDetection],
    line_ids: &[i64],
    threshold_override: Option<i64>,
    cache: &MetadataCache,
) -> AppResult<Vec<DowntimeEvent>> {
    if detections.is_empty() {
        return Ok(Vec::new());
    }

    let mut events = Vec::new();

    for &line_id in line_ids {
        let Some(line) = cache.get_production_line(line_id)? else {
            continue;
        };
        if !line.auto_detect_downtime {
            continue;
        }

        let threshold = threshold_override.unwrap_or(line.downtime_threshold);
        if threshold <= 0 {
            continue;
        }

        let mut times: Vec<_> = detections.iter().filter(|d| d.line_id == line_id).map(|d| d.detected_at).collect();
        if times.len() < 2 {
            continue;
        }
        times.sort();

        let mut current_start = None;
        let mut current_end = None;

        for window in times.windows(2) {
            let (prev, next) = (window[0], window[1]);
            let gap_seconds = (next - prev).num_seconds();

            if gap_seconds > threshold {
                if current_start.is_none() {
                    current_start = Some(prev);
                }
                current_end = Some(next);
            } else if let (Some(start), Some(end)) = (current_start.take(), current_end.take()) {
                events.push(make_event(start, end, line_id));
            }
        }

        if let (Some(start), Some(end)) = (current_start, current_end) {
            events.push(make_event(start, end, line_id));
        }
    }

    Ok(events)
}

fn make_event(start: chrono::NaiveDateTime, end: chrono::NaiveDateTime, line_id: i64) -> DowntimeEvent {
    DowntimeEvent {
        line_id,
        line_name: String::new(),
        start_time: start,
        end_time: end,
        duration: (end - start).num_seconds() as f64,
        reason_code: None,
        is_manual: false,
        source: DowntimeSource::Calculated,
    }
}

/// Drops calculated downtimes overlapping any DB-registered downtime on
/// the same line. DB records win — they carry operator-confirmed data.
pub fn remove_overlapping(calculated: Vec<DowntimeEvent>, db_events: &[DowntimeEvent]) -> Vec<DowntimeEvent> {
    if calculated.is_empty() || db_events.is_empty() {
        return calculated;
    }

    calculated
        .into_iter()
        .filter(|calc| !db_events.iter().any(|db| calc.overlaps(db)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn consecutive_gaps_merge_into_one_event() {
        let a = DowntimeEvent {
            line_id: 1,
            line_name: String::new(),
            start_time: ts(10, 0),
            end_time: ts(10, 30),
            duration: 1800.0,
            reason_code: None,
            is_manual: false,
            source: DowntimeSource::Calculated,
        };
        let b = DowntimeEvent {
            line_id: 1,
            line_name: String::new(),
            start_time: ts(10, 15),
            end_time: ts(10, 45),
            duration: 1800.0,
            reason_code: None,
            is_manual: false,
            source: DowntimeSource::Db,
        };
        assert!(a.overlaps(&b));
    }

    #[test]
    fn remove_overlapping_keeps_non_overlapping_events() {
        let calc = DowntimeEvent {
            line_id: 1,
            line_name: String::new(),
            start_time: ts(8, 0),
            end_time: ts(8, 10),
            duration: 600.0,
            reason_code: None,
            is_manual: false,
            source: DowntimeSource::Calculated,
        };
        let db = DowntimeEvent {
            line_id: 1,
            line_name: String::new(),
            start_time: ts(12, 0),
            end_time: ts(12, 30),
            duration: 1800.0,
            reason_code: None,
            is_manual: false,
            source: DowntimeSource::Db,
        };
        let kept = remove_overlapping(vec![calc], &[db]);
        assert_eq!(kept.len(), 1);
    }
}
