//! The seven `kpi` category widgets. The four OEE-derived ones
//! (`KpiOee`, `KpiAvailability`, `KpiPerformance`, `KpiQuality`) all read
//! from [`super::oee::compute_oee`] so the scheduling/downtime/performance
//! math exists exactly once.

use serde_json::{json, Map};

use crate::error::AppResult;
use crate::models::WidgetResult;

use super::context::WidgetContext;
use super::helpers::{default_config_str, downtime_minutes};
use super::oee::compute_oee;

fn meta(category: &str) -> Map<String, serde_json::Value> {
    let mut m = Map::new();
    m.insert("widget_category".to_string(), json!(category));
    m
}

pub fn kpi_total_production(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let value = if ctx.data.is_empty() {
        0
    } else {
        ctx.data.iter().filter(|d| d.is_output()).count()
    };
    let unit = default_config_str(ctx.config, "unit", "unidades");

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({ "value": value, "unit": unit, "trend": Option::<f64>::None }),
        meta("kpi"),
    ))
}

pub fn kpi_total_weight(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let total_weight: f64 = ctx.data.iter().filter(|d| d.is_output()).map(|d| d.product_weight).sum();
    let unit = default_config_str(ctx.config, "unit", "kg");

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({ "value": round2(total_weight), "unit": unit, "trend": Option::<f64>::None }),
        meta("kpi"),
    ))
}

pub fn kpi_total_downtime(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let count = ctx.downtime.len();
    let total_minutes = if ctx.downtime.is_empty() { 0.0 } else { round1(downtime_minutes(ctx.downtime, None)) };

    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({
            "value": count,
            "unit": "paradas",
            "total_minutes": total_minutes,
            "trend": Option::<f64>::None,
        }),
        meta("kpi"),
    ))
}

pub fn kpi_oee(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let calc = compute_oee(ctx)?;
    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({
            "value": calc.oee,
            "unit": "%",
            "availability": calc.availability,
            "performance": calc.performance,
            "quality": calc.quality,
            "scheduled_minutes": calc.scheduled_minutes,
            "downtime_minutes": calc.downtime_minutes,
            "trend": Option::<f64>::None,
        }),
        meta("kpi"),
    ))
}

pub fn kpi_availability(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let calc = compute_oee(ctx)?;
    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({
            "value": calc.availability,
            "unit": "%",
            "scheduled_minutes": calc.scheduled_minutes,
            "downtime_minutes": calc.downtime_minutes,
            "trend": Option::<f64>::None,
        }),
        meta("kpi"),
    ))
}

pub fn kpi_performance(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let calc = compute_oee(ctx)?;
    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({ "value": calc.performance, "unit": "%", "trend": Option::<f64>::None }),
        meta("kpi"),
    ))
}

pub fn kpi_quality(ctx: &WidgetContext) -> AppResult<WidgetResult> {
    let calc = compute_oee(ctx)?;
    Ok(WidgetResult::new(
        ctx.widget_id,
        ctx.display_name.clone(),
        "kpi",
        json!({ "value": calc.quality, "unit": "%", "trend": Option::<f64>::None }),
        meta("kpi"),
    ))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
