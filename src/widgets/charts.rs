//! The five `chart` category widgets.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::models::{EnrichedDetection, WidgetResult};

use super::context::WidgetContext;
use super::helpers::{
    self, alpha, build_full_index, daterange_bounds, find_nearest_label_index, format_time_labels,
    lines_with_input_output, shift_adjusted_window, Interval, FALLBACK_PALETTE,
};

fn meta(category: &str, extra: Map<String, Value>) -> Map<String, Value> {
    let mut m = extra;
    m.insert("widget_category".to_string(), json!(category));
    m
}

fn empty(ctx: &WidgetContext) -> WidgetResult {
    WidgetResult::empty(ctx.widget_id, ctx.display_name.clone(), "chart")
}

/// Counts timestamps into buckets floored to `interval`.
fn bucket_counts<'a>(items: impl Iterator<Item = &'a chrono::NaiveDateTime>, interval: Interval) -> HashMap<chrono::NaiveDateTime, i64> {
    let mut counts = HashMap::new();
    for ts in items {
        *counts.entry(interval.floor(*ts)).or_insert(0) += 1;
    }
    counts
}

fn reindex(counts: &HashMap<chrono::NaiveDateTime, i64>, index: &[chrono::NaiveDateTime]) -> Vec<i64> {
    index.iter().map(|ts| *counts.get(ts).unwrap_or(&0)).collect()
}

// ── ProductionTimeChart ──────────────────────────────────────────

pub fn production_time_chart(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() {
        return Ok(empty(ctx));
    }

    let interval = Interval::parse(ctx.interval());
    let curve_type = helpers::default_config_str(ctx.config, "curve_type", "smooth");
    let show_downtime = ctx.show_downtime();

    let mut products: Vec<&str> = ctx.data.iter().map(|d| d.product_name.as_str()).collect();
    products.sort_unstable();
    products.dedup();

    let all_counts = bucket_counts(ctx.data.iter().map(|d| &d.detected_at), interval);

    let index = match daterange_bounds(ctx.params) {
        Some((start, end)) => build_full_index(interval.floor(start), interval.floor(end), interval),
        None => {
            let mut keys: Vec<_> = all_counts.keys().copied().collect();
            keys.sort();
            keys
        }
    };

    if index.is_empty() {
        return Ok(empty(ctx));
    }

    let global_series = reindex(&all_counts, &index);
    let labels = format_time_labels(&index, interval);

    let datasets = build_datasets(ctx.data, &products, &index, &global_series, interval, curve_type);
    let class_details = build_class_details(ctx.data, interval);
    let downtime_events = build_downtime_overlay(ctx, show_downtime, &index);

    let mut data = Map::new();
    data.insert("labels".to_string(), json!(labels));
    data.insert("datasets".to_string(), json!(datasets));
    data.insert("curve_type".to_string(), json!(curve_type));
    data.insert("class_details".to_string(), json!(class_details));
    if !downtime_events.is_empty() {
        data.insert("downtime_events".to_string(), json!(downtime_events));
    }

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "chart",
        Value::Object(data),
        meta("chart", Map::from_iter([
            ("total_points".to_string(), json!(index.len())),
            ("show_downtime".to_string(), json!(show_downtime)),
            ("downtime_count".to_string(), json!(downtime_events.len())),
        ])),
    ))
}

fn build_datasets(
    detections: &[EnrichedDetection],
    products: &[&str],
    index: &[chrono::NaiveDateTime],
    global_series: &[i64],
    interval: Interval,
    curve_type: &str,
) -> Vec<Value> {
    let stacked = curve_type == "stacked";
    let mut datasets = Vec::new();

    if products.len() > 1 {
        for (idx, &product) in products.iter().enumerate() {
            let rows: Vec<&EnrichedDetection> = detections.iter().filter(|d| d.product_name == product).collect();
            let color = rows.first().map(|d| d.product_color.clone()).unwrap_or_else(|| FALLBACK_PALETTE[idx % FALLBACK_PALETTE.len()].to_string());
            let counts = bucket_counts(rows.iter().map(|d| &d.detected_at), interval);
            let series = reindex(&counts, index);
            datasets.push(json!({
                "label": product,
                "data": series,
                "borderColor": color,
                "backgroundColor": alpha(&color, if stacked { 0.25 } else { 0.08 }),
                "fill": stacked,
            }));
        }
    } else {
        let color = detections.first().map(|d| d.product_color.clone()).unwrap_or_else(|| "#3b82f6".to_string());
        let label = products.first().copied().unwrap_or("Producción");
        datasets.push(json!({
            "label": label,
            "data": global_series,
            "borderColor": color,
            "backgroundColor": alpha(&color, 0.1),
            "fill": true,
        }));
    }

    datasets
}

fn build_class_details(detections: &[EnrichedDetection], interval: Interval) -> BTreeMap<String, BTreeMap<String, i64>> {
    let mut grouped: BTreeMap<chrono::NaiveDateTime, BTreeMap<String, i64>> = BTreeMap::new();
    for d in detections {
        let bucket = interval.floor(d.detected_at);
        *grouped.entry(bucket).or_default().entry(d.product_name.clone()).or_insert(0) += 1;
    }

    let mut out = BTreeMap::new();
    for (ts, breakdown) in grouped {
        let label = format_time_labels(&[ts], interval).remove(0);
        out.insert(label, breakdown);
    }
    out
}

fn build_downtime_overlay(ctx: &WidgetContext, show_downtime: bool, index: &[chrono::NaiveDateTime]) -> Vec<Value> {
    if !show_downtime || !ctx.has_downtime() {
        return Vec::new();
    }

    let mut events = Vec::new();
    for evt in ctx.downtime {
        let start_idx = find_nearest_label_index(index, evt.start_time);
        let end_idx = find_nearest_label_index(index, evt.end_time);
        let duration_min = (evt.duration / 60.0 * 10.0).round() / 10.0;

        let has_incident = evt.reason_code.is_some_and(|r| r != 0);
        let desc = evt
            .reason_code
            .filter(|_| has_incident)
            .and_then(|r| ctx.cache.get_incident(r).ok().flatten())
            .map(|i| i.description)
            .unwrap_or_default();

        events.push(json!({
            "xMin": start_idx,
            "xMax": end_idx,
            "start_time": evt.start_time.format("%H:%M").to_string(),
            "end_time": evt.end_time.format("%H:%M").to_string(),
            "duration_min": duration_min,
            "reason": desc,
            "has_incident": has_incident,
            "source": match evt.source { crate::models::DowntimeSource::Db => "db", crate::models::DowntimeSource::Calculated => "calculated" },
            "line_name": evt.line_name,
        }));
    }
    events
}

// ── AreaDetectionChart ───────────────────────────────────────────

pub fn area_detection_chart(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() {
        return Ok(empty(ctx));
    }

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for d in ctx.data {
        *counts.entry(d.area_name.clone()).or_insert(0) += 1;
    }
    let mut series: Vec<(String, i64)> = counts.into_iter().collect();
    series.sort_by(|a, b| b.1.cmp(&a.1));

    let labels: Vec<String> = series.iter().map(|(k, _)| k.clone()).collect();
    let values: Vec<i64> = series.iter().map(|(_, v)| *v).collect();
    let colors: Vec<&str> = (0..series.len()).map(|i| FALLBACK_PALETTE[i % FALLBACK_PALETTE.len()]).collect();

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "chart",
        json!({
            "labels": labels,
            "datasets": [{ "label": "Detecciones por Área", "data": values, "backgroundColor": colors }],
        }),
        meta("chart", Map::from_iter([("total_points".to_string(), json!(series.len()))])),
    ))
}

// ── ProductDistributionChart ─────────────────────────────────────

pub fn product_distribution_chart(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.data.is_empty() {
        return Ok(empty(ctx));
    }

    let mut grouped: BTreeMap<(String, String), i64> = BTreeMap::new();
    for d in ctx.data {
        *grouped.entry((d.product_name.clone(), d.product_color.clone())).or_insert(0) += 1;
    }

    let labels: Vec<String> = grouped.keys().map(|(name, _)| name.clone()).collect();
    let colors: Vec<String> = grouped.keys().map(|(_, color)| color.clone()).collect();
    let values: Vec<i64> = grouped.values().copied().collect();

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "chart",
        json!({
            "labels": labels,
            "datasets": [{ "data": values, "backgroundColor": colors }],
        }),
        meta("chart", Map::from_iter([("total_points".to_string(), json!(grouped.len()))])),
    ))
}

// ── EntryOutputCompareChart ───────────────────────────────────────

pub fn entry_output_compare_chart(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let relevant: Vec<&EnrichedDetection> = ctx.data.iter().filter(|d| d.is_input() || d.is_output()).collect();
    if relevant.is_empty() {
        return Ok(empty(ctx));
    }

    let interval = Interval::parse(ctx.interval());
    let dual_lines = lines_with_input_output(ctx.lines_queried, ctx.cache)?;

    let output_counts = bucket_counts(relevant.iter().filter(|d| d.is_output()).map(|d| &d.detected_at), interval);

    let dual: Vec<&EnrichedDetection> = ctx
        .data
        .iter()
        .filter(|d| (d.is_input() || d.is_output()) && dual_lines.contains(&d.line_id))
        .collect();
    let input_counts = bucket_counts(dual.iter().filter(|d| d.is_input()).map(|d| &d.detected_at), interval);
    let output_dual_counts = bucket_counts(dual.iter().filter(|d| d.is_output()).map(|d| &d.detected_at), interval);

    let index = match shift_adjusted_window(ctx.params, ctx.cache)? {
        Some((start, end)) => build_full_index(interval.floor(start), interval.floor(end), interval),
        None => {
            let mut keys: Vec<_> = output_counts.keys().chain(input_counts.keys()).chain(output_dual_counts.keys()).copied().collect();
            keys.sort();
            keys.dedup();
            keys
        }
    };

    if index.is_empty() {
        return Ok(empty(ctx));
    }

    let entrada_vals = reindex(&input_counts, &index);
    let salida_vals = reindex(&output_counts, &index);
    let descarte_vals: Vec<i64> = if output_dual_counts.is_empty() {
        vec![0; index.len()]
    } else {
        entrada_vals.iter().zip(reindex(&output_dual_counts, &index)).map(|(e, s)| (e - s).max(0)).collect()
    };

    let labels = format_time_labels(&index, interval);

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "chart",
        json!({
            "labels": labels,
            "datasets": [
                { "label": "Entrada", "data": entrada_vals, "backgroundColor": "#22c55e" },
                { "label": "Salida", "data": salida_vals, "backgroundColor": "#3b82f6" },
                { "label": "Descarte", "data": descarte_vals, "backgroundColor": "#ef4444" },
            ],
            "summary": {
                "entrada": entrada_vals.iter().sum::<i64>(),
                "salida": salida_vals.iter().sum::<i64>(),
                "descarte": descarte_vals.iter().sum::<i64>(),
            },
        }),
        meta("chart", Map::from_iter([("total_points".to_string(), json!(index.len()))])),
    ))
}

// ── ScatterChart ──────────────────────────────────────────────────

pub fn scatter_chart(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    if ctx.downtime.is_empty() {
        return Ok(empty(ctx));
    }

    let mut incident_points = Vec::new();
    let mut gap_points = Vec::new();

    for evt in ctx.downtime {
        use chrono::Timelike;
        let x = ((evt.start_time.hour() as f64 + evt.start_time.minute() as f64 / 60.0) * 100.0).round() / 100.0;
        let y = (evt.duration / 60.0 * 10.0).round() / 10.0;

        let has_incident = evt.reason_code.is_some_and(|r| r != 0);
        let tooltip = evt
            .reason_code
            .filter(|_| has_incident)
            .and_then(|r| ctx.cache.get_incident(r).ok().flatten())
            .map(|i| i.description)
            .unwrap_or_default();

        let point = json!({ "x": x, "y": y, "tooltip": tooltip });
        if has_incident {
            incident_points.push(point);
        } else {
            gap_points.push(point);
        }
    }

    let mut datasets = Vec::new();
    let incident_count = incident_points.len();
    let gap_count = gap_points.len();
    if !incident_points.is_empty() {
        datasets.push(json!({
            "label": "Con incidente",
            "data": incident_points,
            "backgroundColor": "rgba(249,115,22,0.7)",
            "borderColor": "rgba(249,115,22,1)",
            "pointRadius": 6,
        }));
    }
    if !gap_points.is_empty() {
        datasets.push(json!({
            "label": "Detectada (gap)",
            "data": gap_points,
            "backgroundColor": "rgba(239,68,68,0.7)",
            "borderColor": "rgba(239,68,68,1)",
            "pointRadius": 6,
        }));
    }

    if datasets.is_empty() {
        return Ok(empty(ctx));
    }

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "chart",
        json!({ "datasets": datasets }),
        meta("chart", Map::from_iter([("total_points".to_string(), json!(incident_count + gap_count))])),
    ))
}
