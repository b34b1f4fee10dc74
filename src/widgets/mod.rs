//! Widget engine — turns a list of widget class names into their
//! rendered [`WidgetResult`]s.
//!
//! The source resolves widgets by dynamically importing
//! `services.widgets.types.<snake_case(class_name)>` and instantiating the
//! class found there. Rust has no runtime module loader, and the widget
//! set is a closed, compile-time-known list (`WIDGET_REGISTRY`), so
//! `dispatch` below is a `match` over the class name instead — same
//! "registry describes it, one function implements it" shape, no
//! reflection required.

pub mod charts;
pub mod context;
pub mod feed;
pub mod helpers;
pub mod indicator;
pub mod kpi;
pub mod oee;
pub mod summary;
pub mod tables;

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;
use crate::models::{DowntimeEvent, EnrichedDetection, WidgetCatalogEntry, WidgetResult};
use crate::registry::widgets;

pub use context::WidgetContext;

#[allow(clippy::too_many_arguments)]
pub fn process_widgets(
    widget_names: &[String],
    detections: &[EnrichedDetection],
    downtime: &[DowntimeEvent],
    lines_queried: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    widget_catalog: &HashMap<i64, WidgetCatalogEntry>,
    cache: &MetadataCache,
    active_threshold_minutes: f64,
    now: NaiveDateTime,
) -> Vec<WidgetResult> {
    widget_names
        .iter()
        .map(|name| {
            process_single(
                name,
                detections,
                downtime,
                lines_queried,
                cleaned,
                widget_catalog,
                cache,
                active_threshold_minutes,
                now,
            )
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn process_single(
    class_name: &str,
    detections: &[EnrichedDetection],
    downtime: &[DowntimeEvent],
    lines_queried: &[i64],
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    widget_catalog: &HashMap<i64, WidgetCatalogEntry>,
    cache: &MetadataCache,
    active_threshold_minutes: f64,
    now: NaiveDateTime,
) -> WidgetResult {
    let Some(descriptor) = widgets::lookup(class_name) else {
        tracing::warn!("widget engine: '{class_name}' not in WIDGET_REGISTRY");
        return WidgetResult::error(0, class_name, "Widget not registered");
    };

    let (widget_id, display_name) = resolve_catalog_info(class_name, widget_catalog);

    let ctx = WidgetContext {
        widget_id,
        widget_name: leak_name(class_name),
        display_name,
        data: detections,
        downtime,
        lines_queried,
        params: cleaned,
        config: &descriptor.default_config,
        cache,
        active_threshold_minutes,
    };

    let result = dispatch(class_name, &ctx, now);

    match result {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("widget engine: error processing '{class_name}': {e}");
            WidgetResult::error(widget_id, ctx.display_name.clone(), e.to_string())
        }
    }
}

fn dispatch(class_name: &str, ctx: &WidgetContext, now: NaiveDateTime) -> AppResult<WidgetResult> {
    match class_name {
        "KpiTotalProduction" => kpi::kpi_total_production(ctx),
        "KpiTotalWeight" => kpi::kpi_total_weight(ctx),
        "KpiOee" => kpi::kpi_oee(ctx),
        "KpiTotalDowntime" => kpi::kpi_total_downtime(ctx),
        "KpiAvailability" => kpi::kpi_availability(ctx),
        "KpiPerformance" => kpi::kpi_performance(ctx),
        "KpiQuality" => kpi::kpi_quality(ctx),
        "ProductionTimeChart" => charts::production_time_chart(ctx),
        "AreaDetectionChart" => charts::area_detection_chart(ctx),
        "ProductDistributionChart" => charts::product_distribution_chart(ctx),
        "EntryOutputCompareChart" => charts::entry_output_compare_chart(ctx),
        "ScatterChart" => charts::scatter_chart(ctx),
        "DowntimeTable" => tables::downtime_table(ctx),
        "ProductRanking" => tables::product_ranking(ctx),
        "LineStatusIndicator" => indicator::line_status_indicator(ctx, now),
        "MetricsSummary" => summary::metrics_summary(ctx),
        "EventFeed" => feed::event_feed(ctx),
        other => {
            tracing::warn!("widget engine: no processor wired for '{other}'");
            Ok(WidgetResult::error(ctx.widget_id, ctx.display_name.clone(), "No processor for this widget"))
        }
    }
}

fn resolve_catalog_info(class_name: &str, widget_catalog: &HashMap<i64, WidgetCatalogEntry>) -> (i64, String) {
    widget_catalog
        .iter()
        .find(|(_, entry)| entry.widget_name == class_name)
        .map(|(&id, entry)| (id, entry.description.clone()))
        .unwrap_or_else(|| (0, class_name.to_string()))
}

/// `WidgetContext::widget_name` wants a `'static` key matching the
/// registry's — this mirrors `dispatch`'s closed set of names rather than
/// borrowing the caller's owned `String`.
fn leak_name(class_name: &str) -> &'static str {
    match class_name {
        "KpiTotalProduction" => "KpiTotalProduction",
        "KpiTotalWeight" => "KpiTotalWeight",
        "KpiOee" => "KpiOee",
        "KpiTotalDowntime" => "KpiTotalDowntime",
        "KpiAvailability" => "KpiAvailability",
        "KpiPerformance" => "KpiPerformance",
        "KpiQuality" => "KpiQuality",
        "ProductionTimeChart" => "ProductionTimeChart",
        "AreaDetectionChart" => "AreaDetectionChart",
        "ProductDistributionChart" => "ProductDistributionChart",
        "EntryOutputCompareChart" => "EntryOutputCompareChart",
        "ScatterChart" => "ScatterChart",
        "DowntimeTable" => "DowntimeTable",
        "ProductRanking" => "ProductRanking",
        "LineStatusIndicator" => "LineStatusIndicator",
        "MetricsSummary" => "MetricsSummary",
        "EventFeed" => "EventFeed",
        _ => "Unknown",
    }
}
