//! `WidgetResolver` — decides which widget class names render for a
//! request: either the caller's explicit `widget_ids` or the tenant's
//! role-based layout.

use std::collections::HashMap;

use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::layout::LayoutService;
use crate::models::WidgetCatalogEntry;

pub struct WidgetResolver;

impl WidgetResolver {
    /// Returns `(widget_names, widget_catalog)`. Empty `widget_names`
    /// means "nothing to render" — callers turn that into an empty
    /// response envelope.
    pub async fn resolve(
        global_pool: &MySqlPool,
        cache: &MetadataCache,
        tenant_id: i64,
        role: &str,
        widget_ids: Option<&[i64]>,
    ) -> AppResult<(Vec<String>, HashMap<i64, WidgetCatalogEntry>)> {
        let catalog = cache.get_widget_catalog()?;

        if let Some(ids) = widget_ids {
            let names = LayoutService::names_from_catalog(&catalog, ids);
            return Ok((names, catalog));
        }

        let Some(layout) = LayoutService::get_layout_config(global_pool, tenant_id, role).await? else {
            tracing::warn!("WidgetResolver: no dashboard_template for tenant_id={tenant_id}, role={role}");
            return Ok((Vec::new(), catalog));
        };

        let names = LayoutService::names_from_catalog(&catalog, &layout.enabled_widget_ids);
        Ok((names, catalog))
    }
}
