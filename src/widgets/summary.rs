//! `MetricsSummary` — the sole `summary` category widget.

use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::models::WidgetResult;

use super::context::WidgetContext;
use super::helpers::downtime_minutes;

pub fn metrics_summary(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() {
        return Ok(WidgetResult::empty(ctx.widget_id, ctx.display_name.clone(), "summary"));
    }

    let total_detections = ctx.data.len();
    let output_count = ctx.data.iter().filter(|d| d.is_output()).count();
    let total_weight: f64 = ctx.data.iter().filter(|d| d.is_output()).map(|d| d.product_weight).sum();

    let first = ctx.data.iter().map(|d| d.detected_at).min().unwrap();
    let last = ctx.data.iter().map(|d| d.detected_at).max().unwrap();
    let hours_span = (last - first).num_seconds() as f64 / 3600.0;

    let avg_per_hour = if hours_span > 0.0 { (output_count as f64 / hours_span * 10.0).round() / 10.0 } else { 0.0 };

    let mut products: Vec<&str> = ctx.data.iter().map(|d| d.product_name.as_str()).collect();
    products.sort_unstable();
    products.dedup();

    let downtime_count = ctx.downtime.len();
    let downtime_min = if ctx.downtime.is_empty() { 0.0 } else { (downtime_minutes(ctx.downtime, None) * 10.0).round() / 10.0 };

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "summary",
        json!({
            "total_detections": total_detections,
            "output_count": output_count,
            "total_weight": (total_weight * 100.0).round() / 100.0,
            "avg_per_hour": avg_per_hour,
            "hours_span": (hours_span * 10.0).round() / 10.0,
            "unique_products": products.len(),
            "lines_count": ctx.lines_queried.len(),
            "downtime_count": downtime_count,
            "downtime_minutes": downtime_min,
            "first_detection": first.format("%Y-%m-%d %H:%M").to_string(),
            "last_detection": last.format("%Y-%m-%d %H:%M").to_string(),
        }),
        meta(),
    ))
}

fn meta() -> Map<String, Value> {
    Map::from_iter([("widget_category".to_string(), json!("summary"))])
}
