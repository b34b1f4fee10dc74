//! `EventFeed` — the sole `feed` category widget. No predecessor in the
//! original system; combines recent detections and downtime events into
//! one chronological activity feed.

use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::models::WidgetResult;

use super::context::WidgetContext;
use super::helpers::default_config_usize;

struct FeedItem {
    timestamp: chrono::NaiveDateTime,
    payload: Value,
}

pub fn event_feed(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() && ctx.downtime.is_empty() {
        return Ok(WidgetResult::empty(ctx.widget_id, ctx.display_name.clone(), "feed"));
    }

    let max_items = default_config_usize(ctx.config, "max_items", 50);

    let mut items: Vec<FeedItem> = Vec::new();

    let mut recent: Vec<_> = ctx.data.iter().collect();
    recent.sort_by_key(|d| std::cmp::Reverse(d.detected_at));
    for d in recent.into_iter().take(max_items) {
        items.push(FeedItem {
            timestamp: d.detected_at,
            payload: json!({
                "type": "detection",
                "timestamp": d.detected_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                "line_name": d.line_name,
                "area_name": d.area_name,
                "product_name": d.product_name,
            }),
        });
    }

    for evt in ctx.downtime {
        items.push(FeedItem {
            timestamp: evt.start_time,
            payload: json!({
                "type": "downtime",
                "timestamp": evt.start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                "line_name": evt.line_name,
                "duration_min": (evt.duration / 60.0 * 10.0).round() / 10.0,
                "source": match evt.source { crate::models::DowntimeSource::Db => "db", crate::models::DowntimeSource::Calculated => "calculated" },
            }),
        });
    }

    items.sort_by_key(|i| std::cmp::Reverse(i.timestamp));
    items.truncate(max_items);

    let total = items.len();
    let events: Vec<Value> = items.into_iter().map(|i| i.payload).collect();

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "feed",
        json!({ "events": events, "total": total }),
        meta(),
    ))
}

fn meta() -> Map<String, Value> {
    Map::from_iter([("widget_category".to_string(), json!("feed"))])
}
