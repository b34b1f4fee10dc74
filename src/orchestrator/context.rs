//! `DashboardContext` — the immutable bundle of data and metadata a
//! single `/dashboard/data` request passes from the orchestrator into
//! the widget engine.

use std::collections::HashMap;

use crate::filters::ResolvedFilter;
use crate::models::{DowntimeEvent, EnrichedDetection, WidgetCatalogEntry};

pub struct DashboardContext {
    pub detections: Vec<EnrichedDetection>,
    pub downtime: Vec<DowntimeEvent>,
    pub cleaned: HashMap<&'static str, ResolvedFilter>,
    pub line_ids: Vec<i64>,
    pub widget_names: Vec<String>,
    pub widget_catalog: HashMap<i64, WidgetCatalogEntry>,
}

impl DashboardContext {
    pub fn is_multi_line(&self) -> bool {
        self.line_ids.len() > 1
    }

    pub fn has_detections(&self) -> bool {
        !self.detections.is_empty()
    }

    pub fn has_downtime(&self) -> bool {
        !self.downtime.is_empty()
    }

    pub fn total_detections(&self) -> usize {
        self.detections.len()
    }

    pub fn total_downtime_events(&self) -> usize {
        self.downtime.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_ctx(line_ids: Vec<i64>) -> DashboardContext {
        DashboardContext {
            detections: Vec::new(),
            downtime: Vec::new(),
            cleaned: HashMap::new(),
            line_ids,
            widget_names: Vec::new(),
            widget_catalog: HashMap::new(),
        }
    }

    #[test]
    fn single_line_is_not_multi_line() {
        let ctx = empty_ctx(vec![7]);
        assert!(!ctx.is_multi_line());
    }

    #[test]
    fn more_than_one_line_is_multi_line() {
        let ctx = empty_ctx(vec![7, 8]);
        assert!(ctx.is_multi_line());
    }

    #[test]
    fn empty_detections_and_downtime_report_false() {
        let ctx = empty_ctx(vec![1]);
        assert!(!ctx.has_detections());
        assert!(!ctx.has_downtime());
        assert_eq!(ctx.total_detections(), 0);
        assert_eq!(ctx.total_downtime_events(), 0);
    }
}
