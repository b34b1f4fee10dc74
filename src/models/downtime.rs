use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A raw row as read off `downtime_events_{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeEventRow {
    pub event_id: i64,
    pub line_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_seconds: i64,
    pub reason_code: Option<i64>,
    pub is_manual: bool,
}

/// Where a `DowntimeEvent` in the unified result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DowntimeSource {
    Db,
    Calculated,
}

/// A downtime event after `DowntimeService::get_downtime` has fused
/// DB-recorded and gap-inferred events and enriched them with `line_name`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeEvent {
    pub line_id: i64,
    pub line_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Duration in seconds, coerced to float to match the source's schema.
    pub duration: f64,
    pub reason_code: Option<i64>,
    pub is_manual: bool,
    pub source: DowntimeSource,
}

impl DowntimeEvent {
    /// `[start, end)` overlap test used by `remove_overlapping`.
    pub fn overlaps(&self, other: &DowntimeEvent) -> bool {
        self.line_id == other.line_id && self.start_time < other.end_time && other.start_time < self.end_time
    }
}
