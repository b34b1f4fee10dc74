//! `ResponseAssembler` — shapes widget results and request metadata
//! into the final `/dashboard/*` JSON contract.

use serde_json::{json, Map, Value};

use crate::models::WidgetResult;

use super::context::DashboardContext;

pub struct ResponseAssembler;

impl ResponseAssembler {
    pub fn assemble(ctx: &DashboardContext, widgets_result: Vec<WidgetResult>, elapsed_seconds: f64) -> Value {
        let widget_count = widgets_result.len();
        let widgets = index_widgets(widgets_result);
        let period = extract_period(ctx);

        json!({
            "widgets": widgets,
            "metadata": {
                "total_detections": ctx.total_detections(),
                "total_downtime_events": ctx.total_downtime_events(),
                "lines_queried": ctx.line_ids,
                "is_multi_line": ctx.is_multi_line(),
                "widget_count": widget_count,
                "period": period,
                "interval": ctx.cleaned.get("interval").map(|f| f.value.clone()).unwrap_or_else(|| json!("hour")),
                "elapsed_seconds": (elapsed_seconds * 1000.0).round() / 1000.0,
                "timestamp": now_iso(),
            }
        })
    }

    pub fn empty(error: &str, now: chrono::NaiveDateTime) -> Value {
        json!({
            "widgets": {},
            "metadata": {
                "total_detections": 0,
                "total_downtime_events": 0,
                "lines_queried": [],
                "is_multi_line": false,
                "widget_count": 0,
                "period": {},
                "interval": "hour",
                "elapsed_seconds": 0,
                "timestamp": now.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "error": error,
            }
        })
    }
}

fn index_widgets(widgets_result: Vec<WidgetResult>) -> Map<String, Value> {
    let mut indexed = Map::new();
    for w in widgets_result {
        let key = w.widget_id.to_string();
        indexed.insert(key, serde_json::to_value(w).unwrap_or(Value::Null));
    }
    indexed
}

fn extract_period(ctx: &DashboardContext) -> Value {
    let Some(daterange) = ctx.cleaned.get("daterange").map(|f| &f.value) else {
        return json!({});
    };
    let Some(obj) = daterange.as_object() else {
        return json!({});
    };

    let mut period = Map::new();
    period.insert("start".to_string(), obj.get("start_date").cloned().unwrap_or_else(|| json!("")));
    period.insert("end".to_string(), obj.get("end_date").cloned().unwrap_or_else(|| json!("")));
    if let Some(st) = obj.get("start_time").filter(|v| !v.is_null()) {
        period.insert("start_time".to_string(), st.clone());
    }
    if let Some(et) = obj.get("end_time").filter(|v| !v.is_null()) {
        period.insert("end_time".to_string(), et.clone());
    }
    Value::Object(period)
}

fn now_iso() -> String {
    chrono::Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ResolvedFilter;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn ctx_with(cleaned: HashMap<&'static str, ResolvedFilter>, line_ids: Vec<i64>) -> DashboardContext {
        DashboardContext {
            detections: Vec::new(),
            downtime: Vec::new(),
            cleaned,
            line_ids,
            widget_names: Vec::new(),
            widget_catalog: HashMap::new(),
        }
    }

    fn resolved(param_name: &'static str, value: Value) -> ResolvedFilter {
        ResolvedFilter {
            filter_id: 1,
            filter_name: param_name.to_string(),
            param_name,
            value,
        }
    }

    #[test]
    fn empty_envelope_reports_the_error_and_zeroes_out_counts() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        let v = ResponseAssembler::empty("No production lines found for the given parameters", now);
        assert_eq!(v["metadata"]["error"], "No production lines found for the given parameters");
        assert_eq!(v["metadata"]["total_detections"], 0);
        assert_eq!(v["metadata"]["widget_count"], 0);
        assert_eq!(v["widgets"], json!({}));
    }

    #[test]
    fn assemble_indexes_widgets_by_widget_id() {
        let ctx = ctx_with(HashMap::new(), vec![1]);
        let results = vec![
            WidgetResult::empty(5, "KpiOee", "kpi"),
            WidgetResult::empty(9, "EventFeed", "feed"),
        ];
        let v = ResponseAssembler::assemble(&ctx, results, 0.01);
        assert!(v["widgets"]["5"].is_object());
        assert!(v["widgets"]["9"].is_object());
        assert_eq!(v["metadata"]["widget_count"], 2);
    }

    #[test]
    fn assemble_preserves_layout_order_even_when_not_lexicographic() {
        let ctx = ctx_with(HashMap::new(), vec![1]);
        let results = vec![
            WidgetResult::empty(5, "KpiOee", "kpi"),
            WidgetResult::empty(9, "EventFeed", "feed"),
            WidgetResult::empty(2, "AreaDetectionChart", "chart"),
        ];
        let v = ResponseAssembler::assemble(&ctx, results, 0.0);
        let keys: Vec<&String> = v["widgets"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["5", "9", "2"]);
    }

    #[test]
    fn assemble_extracts_period_from_daterange_filter() {
        let mut cleaned = HashMap::new();
        cleaned.insert(
            "daterange",
            resolved(
                "daterange",
                json!({"start_date": "2026-01-01", "end_date": "2026-01-31", "start_time": null, "end_time": null}),
            ),
        );
        let ctx = ctx_with(cleaned, vec![1]);
        let v = ResponseAssembler::assemble(&ctx, Vec::new(), 0.0);
        assert_eq!(v["metadata"]["period"]["start"], "2026-01-01");
        assert_eq!(v["metadata"]["period"]["end"], "2026-01-31");
        assert!(v["metadata"]["period"].get("start_time").is_none());
    }

    #[test]
    fn assemble_defaults_interval_to_hour_when_unset() {
        let ctx = ctx_with(HashMap::new(), vec![1]);
        let v = ResponseAssembler::assemble(&ctx, Vec::new(), 0.0);
        assert_eq!(v["metadata"]["interval"], "hour");
    }
}
