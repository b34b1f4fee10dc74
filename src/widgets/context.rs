//! `WidgetContext` — everything a widget processor needs, assembled by
//! the engine before dispatch. Widgets are "dumb processors": they never
//! know whether their data came from a tenant DB query or somewhere else.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::MetadataCache;
use crate::filters::ResolvedFilter;
use crate::models::{DowntimeEvent, EnrichedDetection};

pub struct WidgetContext<'a> {
    pub widget_id: i64,
    pub widget_name: &'static str,
    pub display_name: String,

    pub data: &'a [EnrichedDetection],
    pub downtime: &'a [DowntimeEvent],
    pub lines_queried: &'a [i64],
    pub params: &'a HashMap<&'static str, ResolvedFilter>,
    pub config: &'a Value,
    pub cache: &'a MetadataCache,
    pub active_threshold_minutes: f64,
}

impl<'a> WidgetContext<'a> {
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn has_downtime(&self) -> bool {
        !self.downtime.is_empty()
    }

    pub fn interval(&self) -> &str {
        self.params.get("interval").and_then(|f| f.value.as_str()).unwrap_or("hour")
    }

    pub fn show_downtime(&self) -> bool {
        self.params.get("show_downtime").and_then(|f| f.value.as_bool()).unwrap_or(false)
    }
}
