//! `DashboardOrchestrator` — the pipeline that turns a raw `/dashboard/*`
//! request into the final JSON response: validate filters, resolve
//! lines and widgets, fetch data, run the widget engine, assemble.

pub mod assembler;
pub mod context;
pub mod resolver;

use std::collections::HashMap;
use std::time::Instant;

use serde_json::Value;
use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::data::{detection_service, downtime_service, line_resolver};
use crate::error::AppResult;
use crate::filters::{FilterEngine, ResolvedFilter};
use crate::widgets;

pub use assembler::ResponseAssembler;
pub use context::DashboardContext;
pub use resolver::WidgetResolver;

pub struct DashboardOrchestrator;

impl DashboardOrchestrator {
    /// Full pipeline: validate → resolve lines → resolve widgets → fetch
    /// → run widget engine → assemble.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        tenant_pool: &MySqlPool,
        global_pool: &MySqlPool,
        cache: &MetadataCache,
        raw_params: &HashMap<String, Value>,
        tenant_id: i64,
        role: &str,
        widget_ids: Option<&[i64]>,
        active_threshold_minutes: f64,
    ) -> AppResult<Value> {
        let t0 = Instant::now();
        let now = chrono::Local::now().naive_local();

        let cleaned = FilterEngine::new(cache).resolve_all(raw_params)?;

        let line_ids = line_resolver::resolve(&cleaned, cache)?;
        if line_ids.is_empty() {
            return Ok(ResponseAssembler::empty("No production lines found for the given parameters", now));
        }

        let (widget_names, widget_catalog) = WidgetResolver::resolve(global_pool, cache, tenant_id, role, widget_ids).await?;
        if widget_names.is_empty() {
            return Ok(ResponseAssembler::empty("No widgets configured for this layout", now));
        }

        let ctx = Self::build_context(tenant_pool, cache, cleaned, line_ids, widget_names, widget_catalog).await?;

        let widgets_result = Self::execute_widgets(&ctx, cache, active_threshold_minutes, now);
        let elapsed = t0.elapsed().as_secs_f64();

        tracing::info!(
            "dashboard pipeline: {} detections, {} downtime events, {} widgets, {:.3}s",
            ctx.total_detections(),
            ctx.total_downtime_events(),
            widgets_result.len(),
            elapsed,
        );

        Ok(ResponseAssembler::assemble(&ctx, widgets_result, elapsed))
    }

    /// Stripped pipeline skipping validation and layout resolution — used
    /// by `/dashboard/preview` and by tests driving pre-validated inputs.
    pub async fn execute_quick(
        tenant_pool: &MySqlPool,
        cache: &MetadataCache,
        cleaned: HashMap<&'static str, ResolvedFilter>,
        widget_names: Vec<String>,
        active_threshold_minutes: f64,
    ) -> AppResult<Value> {
        let t0 = Instant::now();
        let now = chrono::Local::now().naive_local();

        let line_ids = line_resolver::resolve(&cleaned, cache)?;
        if line_ids.is_empty() {
            return Ok(ResponseAssembler::empty("No production lines resolved", now));
        }

        let widget_catalog = cache.get_widget_catalog()?;
        let ctx = Self::build_context(tenant_pool, cache, cleaned, line_ids, widget_names, widget_catalog).await?;
        let widgets_result = Self::execute_widgets(&ctx, cache, active_threshold_minutes, now);
        let elapsed = t0.elapsed().as_secs_f64();

        Ok(ResponseAssembler::assemble(&ctx, widgets_result, elapsed))
    }

    async fn build_context(
        tenant_pool: &MySqlPool,
        cache: &MetadataCache,
        cleaned: HashMap<&'static str, ResolvedFilter>,
        line_ids: Vec<i64>,
        widget_names: Vec<String>,
        widget_catalog: HashMap<i64, crate::models::WidgetCatalogEntry>,
    ) -> AppResult<DashboardContext> {
        let detections = detection_service::get_enriched_detections(tenant_pool, &line_ids, &cleaned, true, cache).await?;

        let threshold_override = cleaned.get("downtime_threshold").and_then(|f| f.value.as_i64());
        let downtime = downtime_service::get_downtime(tenant_pool, &line_ids, &cleaned, Some(&detections), threshold_override, cache).await?;

        Ok(DashboardContext {
            detections,
            downtime,
            cleaned,
            line_ids,
            widget_names,
            widget_catalog,
        })
    }

    fn execute_widgets(
        ctx: &DashboardContext,
        cache: &MetadataCache,
        active_threshold_minutes: f64,
        now: chrono::NaiveDateTime,
    ) -> Vec<crate::models::WidgetResult> {
        widgets::process_widgets(
            &ctx.widget_names,
            &ctx.detections,
            &ctx.downtime,
            &ctx.line_ids,
            &ctx.cleaned,
            &ctx.widget_catalog,
            cache,
            active_threshold_minutes,
            now,
        )
    }
}
