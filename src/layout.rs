//! `LayoutService` — resolves the dashboard layout (which widgets, which
//! filters) assigned to a tenant's role from `dashboard_template`.

use sqlx::MySqlPool;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::models::{DashboardTemplate, WidgetCatalogEntry};

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub tenant_id: i64,
    pub role: String,
    pub enabled_widget_ids: Vec<i64>,
    pub enabled_filter_ids: Vec<i64>,
}

impl LayoutConfig {
    pub fn has_widgets(&self) -> bool {
        !self.enabled_widget_ids.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        !self.enabled_filter_ids.is_empty()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedWidget {
    pub widget_id: i64,
    pub widget_name: String,
    pub description: String,
}

pub struct LayoutService;

impl LayoutService {
    /// Loads `layout_config` by `(tenant_id, role)`, matching `role_access`
    /// case-insensitively. Returns `None` if no template row exists.
    pub async fn get_layout_config(global_pool: &MySqlPool, tenant_id: i64, role: &str) -> AppResult<Option<LayoutConfig>> {
        let row = sqlx::query_as::<_, DashboardTemplateRow>(
            "SELECT template_id, tenant_id, role_access, layout_config FROM dashboard_template \
             WHERE tenant_id = ? AND LOWER(role_access) = LOWER(?)",
        )
        .bind(tenant_id)
        .bind(role)
        .fetch_optional(global_pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let template: DashboardTemplate = row.into();
        let widgets = template
            .layout_config
            .get("widgets")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();
        let filters = template
            .layout_config
            .get("filters")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();

        Ok(Some(LayoutConfig {
            tenant_id,
            role: role.to_string(),
            enabled_widget_ids: widgets,
            enabled_filter_ids: filters,
        }))
    }

    /// Resolves widget IDs to full metadata from the `widget_catalog`
    /// cache, preserving the order given in `widget_ids`.
    pub fn resolve_widgets(cache: &MetadataCache, widget_ids: &[i64]) -> AppResult<Vec<ResolvedWidget>> {
        let catalog = cache.get_widget_catalog()?;
        let mut resolved = Vec::with_capacity(widget_ids.len());
        for &wid in widget_ids {
            match catalog.get(&wid) {
                Some(entry) => resolved.push(ResolvedWidget {
                    widget_id: wid,
                    widget_name: entry.widget_name.clone(),
                    description: entry.description.clone(),
                }),
                None => tracing::warn!("layout service: widget_id={wid} not in widget_catalog cache"),
            }
        }
        Ok(resolved)
    }

    /// Class names resolved from `widget_ids` against the catalog,
    /// skipping entries with no catalog match.
    pub fn names_from_catalog(catalog: &std::collections::HashMap<i64, WidgetCatalogEntry>, widget_ids: &[i64]) -> Vec<String> {
        widget_ids
            .iter()
            .filter_map(|wid| {
                let entry = catalog.get(wid);
                if entry.is_none() {
                    tracing::warn!("layout service: widget_id={wid} not in catalog");
                }
                entry.map(|e| e.widget_name.clone())
            })
            .collect()
    }
}

#[derive(sqlx::FromRow)]
struct DashboardTemplateRow {
    template_id: i64,
    tenant_id: i64,
    role_access: String,
    layout_config: sqlx::types::Json<serde_json::Value>,
}

impl From<DashboardTemplateRow> for DashboardTemplate {
    fn from(r: DashboardTemplateRow) -> Self {
        DashboardTemplate {
            template_id: r.template_id,
            tenant_id: r.tenant_id,
            role_access: r.role_access,
            layout_config: r.layout_config.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn names_from_catalog_preserves_order_and_skips_missing() {
        let mut catalog = HashMap::new();
        catalog.insert(1, WidgetCatalogEntry { widget_id: 1, widget_name: "KpiOee".to_string(), description: "OEE".to_string() });
        catalog.insert(2, WidgetCatalogEntry { widget_id: 2, widget_name: "EventFeed".to_string(), description: "Feed".to_string() });

        let names = LayoutService::names_from_catalog(&catalog, &[2, 99, 1]);
        assert_eq!(names, vec!["EventFeed".to_string(), "KpiOee".to_string()]);
    }
}
