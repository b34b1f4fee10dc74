//! `LineStatusIndicator` — the sole `indicator` category widget.

use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::models::WidgetResult;

use super::context::WidgetContext;

pub fn line_status_indicator(ctx: &WidgetContext, now: chrono::NaiveDateTime) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() {
        return Ok(WidgetResult::empty(ctx.widget_id, ctx.display_name.clone(), "indicator"));
    }

    let mut lines_info = Vec::new();

    for &line_id in ctx.lines_queried {
        let Some(line) = ctx.cache.get_production_line(line_id)? else {
            continue;
        };

        let line_rows: Vec<_> = ctx.data.iter().filter(|d| d.line_id == line_id).collect();
        let count = line_rows.len();

        let (status, last_dt_str, minutes_since) = if count > 0 {
            let last = line_rows.iter().map(|d| d.detected_at).max().unwrap();
            let minutes_since = (now - last).num_seconds() as f64 / 60.0;
            let status = if minutes_since < ctx.active_threshold_minutes { "active" } else { "idle" };
            (status, last.format("%Y-%m-%d %H:%M").to_string(), Some(minutes_since))
        } else {
            ("no_data", "—".to_string(), None)
        };

        let output_count = line_rows.iter().filter(|d| d.is_output()).count();

        lines_info.push(json!({
            "line_id": line_id,
            "line_name": line.line_name,
            "line_code": line.line_code,
            "status": status,
            "detection_count": count,
            "output_count": output_count,
            "last_detection": last_dt_str,
            "minutes_since_last": minutes_since.map(|m| (m * 10.0).round() / 10.0),
        }));
    }

    let total_lines = lines_info.len();

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "indicator",
        json!({ "lines": lines_info, "total_lines": total_lines }),
        meta_map(total_lines),
    ))
}

fn meta_map(total_lines: usize) -> Map<String, Value> {
    Map::from_iter([
        ("widget_category".to_string(), json!("status")),
        ("total_lines".to_string(), json!(total_lines)),
    ])
}
