//! `table` and `ranking` category widgets.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::error::AppResult;
use crate::models::WidgetResult;

use super::context::WidgetContext;

fn meta(category: &str, extra: Map<String, Value>) -> Map<String, Value> {
    let mut m = extra;
    m.insert("widget_category".to_string(), json!(category));
    m
}

const DOWNTIME_COLUMNS: &[(&str, &str)] = &[
    ("start_time", "Inicio"),
    ("end_time", "Fin"),
    ("duration_min", "Duración (min)"),
    ("failure_type", "Tipo de Falla"),
    ("failure_desc", "Descripción Falla"),
    ("incident_code", "Código Incidente"),
    ("incident_desc", "Incidente"),
    ("line_name", "Línea"),
];

pub fn downtime_table(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let columns: Vec<Value> = DOWNTIME_COLUMNS.iter().map(|(k, l)| json!({ "key": k, "label": l })).collect();

    if ctx.downtime.is_empty() {
        return Ok(WidgetResult::new(
            ctx.widget_id,
            ctx.display_name.clone(),
            "table",
            json!({ "columns": columns, "rows": Vec::<Value>::new() }),
            meta("table", Map::from_iter([("total_rows".to_string(), json!(0))])),
        ));
    }

    let failures = ctx.cache.get_failures()?;
    let incidents = ctx.cache.get_incidents()?;

    let mut rows = Vec::with_capacity(ctx.downtime.len());
    for evt in ctx.downtime {
        let incident = evt.reason_code.filter(|&r| r != 0).and_then(|r| incidents.get(&r));
        let incident_code = incident.map(|i| i.incident_code.clone()).unwrap_or_default();
        let incident_desc = incident.map(|i| i.description.clone()).unwrap_or_default();

        let failure = incident.and_then(|i| failures.get(&i.failure_id));
        let failure_type = failure.map(|f| f.type_failure.clone()).unwrap_or_default();
        let failure_desc = failure.map(|f| f.description.clone()).unwrap_or_default();

        rows.push(json!({
            "start_time": evt.start_time.format("%Y-%m-%d %H:%M").to_string(),
            "end_time": evt.end_time.format("%Y-%m-%d %H:%M").to_string(),
            "duration_min": (evt.duration / 60.0 * 10.0).round() / 10.0,
            "failure_type": failure_type,
            "failure_desc": failure_desc,
            "incident_code": incident_code,
            "incident_desc": incident_desc,
            "line_name": evt.line_name,
        }));
    }

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "table",
        json!({ "columns": columns, "rows": rows }),
        meta("table", Map::from_iter([("total_rows".to_string(), json!(rows.len()))])),
    ))
}

struct ProductAgg {
    product_code: String,
    product_color: String,
    count: i64,
    total_weight: f64,
}

pub fn product_ranking(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let output: Vec<_> = ctx.data.iter().filter(|d| d.is_output()).collect();
    if output.is_empty() {
        return Ok(WidgetResult::empty(ctx.widget_id, ctx.display_name.clone(), "ranking"));
    }

    let total = output.len() as f64;

    let mut grouped: BTreeMap<String, ProductAgg> = BTreeMap::new();
    for d in &output {
        let entry = grouped.entry(d.product_name.clone()).or_insert_with(|| ProductAgg {
            product_code: d.product_code.clone(),
            product_color: d.product_color.clone(),
            count: 0,
            total_weight: 0.0,
        });
        entry.count += 1;
        entry.total_weight += d.product_weight;
    }

    let mut rows: Vec<(String, ProductAgg)> = grouped.into_iter().collect();
    rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));

    let row_count = rows.len();
    let rows: Vec<Value> = rows
        .into_iter()
        .map(|(name, agg)| {
            let pct = (agg.count as f64 / total * 1000.0).round() / 10.0;
            json!({
                "product_name": name,
                "product_code": agg.product_code,
                "product_color": agg.product_color,
                "count": agg.count,
                "total_weight": (agg.total_weight * 100.0).round() / 100.0,
                "percentage": pct,
            })
        })
        .collect();

    let columns = json!([
        { "key": "product_name", "label": "Producto" },
        { "key": "count", "label": "Cantidad" },
        { "key": "total_weight", "label": "Peso (kg)" },
        { "key": "percentage", "label": "% del Total" },
    ]);

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "ranking",
        json!({ "columns": columns, "rows": rows, "total_production": output.len() }),
        meta("table", Map::from_iter([("total_rows".to_string(), json!(row_count))])),
    ))
}
