//! Shared helpers for widget processors: scheduling math, interval
//! bucketing, time-label formatting, and the fallback colour palette.
//! No widget-specific logic lives here.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

use crate::cache::MetadataCache;
use crate::data::sql_clauses::parse_daterange;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::{DowntimeEvent, Shift};

// ── Interval bucketing ───────────────────────────────────────────

/// The charting granularities a request can ask for via the `interval`
/// filter. Unknown values fall back to `Hour`, matching the source's
/// `INTERVAL_FREQ_MAP.get(interval, "1h")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Minute,
    FifteenMin,
    Hour,
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "minute" => Interval::Minute,
            "15min" => Interval::FifteenMin,
            "day" => Interval::Day,
            "week" => Interval::Week,
            "month" => Interval::Month,
            _ => Interval::Hour,
        }
    }

    /// Floors `ts` to the start of its bucket under this interval.
    pub fn floor(self, ts: NaiveDateTime) -> NaiveDateTime {
        match self {
            Interval::Minute => ts.with_second(0).unwrap().with_nanosecond(0).unwrap(),
            Interval::FifteenMin => {
                let minute = ts.minute() - (ts.minute() % 15);
                ts.with_minute(minute).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap()
            }
            Interval::Hour => ts.with_minute(0).unwrap().with_second(0).unwrap().with_nanosecond(0).unwrap(),
            Interval::Day => ts.date().and_hms_opt(0, 0, 0).unwrap(),
            Interval::Week => {
                let monday = ts.date() - Duration::days(ts.weekday().num_days_from_monday() as i64);
                monday.and_hms_opt(0, 0, 0).unwrap()
            }
            Interval::Month => NaiveDate::from_ymd_opt(ts.year(), ts.month(), 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    fn step(self, ts: NaiveDateTime) -> NaiveDateTime {
        match self {
            Interval::Minute => ts + Duration::minutes(1),
            Interval::FifteenMin => ts + Duration::minutes(15),
            Interval::Hour => ts + Duration::hours(1),
            Interval::Day => ts + Duration::days(1),
            Interval::Week => ts + Duration::weeks(1),
            Interval::Month => {
                let (y, m) = if ts.month() == 12 { (ts.year() + 1, 1) } else { (ts.year(), ts.month() + 1) };
                NaiveDate::from_ymd_opt(y, m, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            }
        }
    }

    /// `strftime`-equivalent label format, mirroring `TIME_LABEL_FORMATS`.
    fn label(self, ts: NaiveDateTime) -> String {
        match self {
            Interval::Minute => ts.format("%H:%M").to_string(),
            Interval::FifteenMin | Interval::Hour => ts.format("%d/%m %H:%M").to_string(),
            Interval::Day => ts.format("%d/%m/%Y").to_string(),
            Interval::Week => ts.format("Sem %d/%m").to_string(),
            Interval::Month => ts.format("%b %Y").to_string(),
        }
    }
}

/// Builds every bucket boundary from `start` through `end` inclusive,
/// stepping by `interval`. Equivalent to `pd.date_range(start, end, freq)`
/// for the fixed-width intervals; `start` is used as-is (not floored),
/// matching the source building its index from the literal queried range.
pub fn build_full_index(start: NaiveDateTime, end: NaiveDateTime, interval: Interval) -> Vec<NaiveDateTime> {
    if start > end {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cur = start;
    while cur <= end {
        out.push(cur);
        cur = interval.step(cur);
    }
    out
}

pub fn format_time_labels(index: &[NaiveDateTime], interval: Interval) -> Vec<String> {
    index.iter().map(|ts| interval.label(*ts)).collect()
}

/// Nearest-bucket index of `target` within `label_list`, clamped to the
/// list's bounds. `label_list` must be sorted ascending.
pub fn find_nearest_label_index(label_list: &[NaiveDateTime], target: NaiveDateTime) -> usize {
    if label_list.is_empty() {
        return 0;
    }
    if target <= label_list[0] {
        return 0;
    }
    if target >= *label_list.last().unwrap() {
        return label_list.len() - 1;
    }
    let mut best = 0;
    let mut best_diff = Duration::MAX;
    for (i, ts) in label_list.iter().enumerate() {
        let diff = if *ts >= target { *ts - target } else { target - *ts };
        if diff < best_diff {
            best_diff = diff;
            best = i;
        }
    }
    best
}

/// Parses the `daterange` filter's bounds into concrete timestamps, if
/// present and well-formed.
pub fn daterange_bounds(cleaned: &HashMap<&'static str, ResolvedFilter>) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let daterange = &cleaned.get("daterange")?.value;
    let (start, end) = parse_daterange(daterange);
    Some((start?, end?))
}

// ── Colour palette ────────────────────────────────────────────────

pub const FALLBACK_PALETTE: [&str; 8] = [
    "#3b82f6", "#22c55e", "#ef4444", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// `"#RRGGBB"` → `"rgba(r,g,b,a)"`. Malformed input falls back to a
/// neutral grey, matching the source's defensive behavior.
pub fn alpha(hex_color: &str, a: f64) -> String {
    let h = hex_color.trim_start_matches('#');
    if h.len() != 6 {
        return format!("rgba(100,100,100,{a})");
    }
    let Ok(r) = u8::from_str_radix(&h[0..2], 16) else {
        return format!("rgba(100,100,100,{a})");
    };
    let Ok(g) = u8::from_str_radix(&h[2..4], 16) else {
        return format!("rgba(100,100,100,{a})");
    };
    let Ok(b) = u8::from_str_radix(&h[4..6], 16) else {
        return format!("rgba(100,100,100,{a})");
    };
    format!("rgba({r},{g},{b},{a})")
}

// ── Scheduling / shift helpers ────────────────────────────────────

/// Total scheduled production minutes for the request: the selected
/// shift's daily duration (or the sum of every active shift's), times
/// the number of calendar days spanned by the `daterange` filter.
pub fn calculate_scheduled_minutes(cleaned: &HashMap<&'static str, ResolvedFilter>, cache: &MetadataCache) -> AppResult<f64> {
    let shift_id = cleaned.get("shift_id").and_then(|f| f.value.as_i64());

    let selected: Vec<Shift> = if let Some(shift_id) = shift_id {
        match cache.get_shift(shift_id)? {
            Some(shift) => vec![shift],
            None => return Ok(0.0),
        }
    } else {
        cache.get_active_shifts()?
    };

    if selected.is_empty() {
        return Ok(0.0);
    }

    let daily: f64 = selected.iter().map(shift_duration_minutes).sum();
    if daily <= 0.0 {
        return Ok(0.0);
    }

    let num_days = count_days(cleaned);
    Ok(daily * num_days.max(1) as f64)
}

fn shift_duration_minutes(shift: &Shift) -> f64 {
    let (Some(start_m), Some(end_m)) = (time_str_to_minutes(&shift.start_time), time_str_to_minutes(&shift.end_time)) else {
        return 0.0;
    };
    if shift.is_overnight || end_m <= start_m {
        (24.0 * 60.0 - start_m) + end_m
    } else {
        end_m - start_m
    }
}

fn time_str_to_minutes(value: &str) -> Option<f64> {
    let mut parts = value.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next().unwrap_or("0").parse().ok()?;
    Some(hours * 60.0 + minutes)
}

fn count_days(cleaned: &HashMap<&'static str, ResolvedFilter>) -> i64 {
    let Some((start, end)) = daterange_bounds(cleaned) else {
        return 1;
    };
    (end.date() - start.date()).num_days().max(0) + 1
}

// ── Area helpers ──────────────────────────────────────────────────

/// Line IDs that have both an `input` and an `output` area — the only
/// lines a quality or discard calculation is meaningful for.
pub fn lines_with_input_output(line_ids: &[i64], cache: &MetadataCache) -> AppResult<Vec<i64>> {
    let mut out = Vec::new();
    for &line_id in line_ids {
        let areas = cache.get_areas_by_line(line_id)?;
        let has_input = areas.iter().any(|a| a.area_type.as_str() == "input");
        let has_output = areas.iter().any(|a| a.area_type.as_str() == "output");
        if has_input && has_output {
            out.push(line_id);
        }
    }
    Ok(out)
}

/// Downtime minutes for `line_id` out of `events` (all lines if `None`).
pub fn downtime_minutes(events: &[DowntimeEvent], line_id: Option<i64>) -> f64 {
    events
        .iter()
        .filter(|e| line_id.is_none_or(|id| e.line_id == id))
        .map(|e| e.duration)
        .sum::<f64>()
        / 60.0
}

/// `"daterange.{start,end}_time"` adjusted to a selected shift's window,
/// used by charts that narrow their x-axis to shift hours.
pub fn shift_adjusted_window(cleaned: &HashMap<&'static str, ResolvedFilter>, cache: &MetadataCache) -> AppResult<Option<(NaiveDateTime, NaiveDateTime)>> {
    let Some((start, end)) = daterange_bounds(cleaned) else {
        return Ok(None);
    };

    let Some(shift_id) = cleaned.get("shift_id").and_then(|f| f.value.as_i64()) else {
        return Ok(Some((start, end)));
    };
    let Some(shift) = cache.get_shift(shift_id)? else {
        return Ok(Some((start, end)));
    };

    let start_time = parse_hhmm(&shift.start_time).unwrap_or_else(|| start.time());
    let end_time = parse_hhmm(&shift.end_time).unwrap_or_else(|| end.time());

    Ok(Some((
        NaiveDateTime::new(start.date(), start_time),
        NaiveDateTime::new(end.date(), end_time),
    )))
}

fn parse_hhmm(value: &str) -> Option<chrono::NaiveTime> {
    let mut parts = value.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next()?.parse().ok()?;
    chrono::NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn default_config_f64(config: &Value, key: &str, default: f64) -> f64 {
    config.get(key).and_then(Value::as_f64).unwrap_or(default)
}

pub fn default_config_str<'a>(config: &'a Value, key: &str, default: &'a str) -> &'a str {
    config.get(key).and_then(Value::as_str).unwrap_or(default)
}

pub fn default_config_usize(config: &Value, key: &str, default: usize) -> usize {
    config.get(key).and_then(Value::as_u64).map(|n| n as usize).unwrap_or(default)
}
