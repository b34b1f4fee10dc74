//! Process-wide, tenant-scoped reference-data cache.
//!
//! Readers never block: they clone the `Arc<Snapshot>` published by the last
//! successful load. The write path (`load_for_tenant` / `refresh`) is
//! serialized behind an exclusive lock and publishes a brand-new snapshot
//! atomically, so a reader either sees the fully-loaded previous tenant or
//! the fully-loaded new one, never a mix.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use sqlx::MySqlPool;

use crate::db::DbManager;
use crate::error::{AppError, AppResult};
use crate::models::{
    Area, AreaType, Failure, FilterRow, Incident, LineGroup, Product, ProductionLine, Shift,
    WidgetCatalogEntry,
};

struct Snapshot {
    db_name: String,
    lines: HashMap<i64, ProductionLine>,
    areas: HashMap<i64, Area>,
    areas_by_line: HashMap<i64, Vec<i64>>,
    products: HashMap<i64, Product>,
    shifts: HashMap<i64, Shift>,
    filters: Vec<FilterRow>,
    failures: HashMap<i64, Failure>,
    incidents: HashMap<i64, Incident>,
    widget_catalog: HashMap<i64, WidgetCatalogEntry>,
}

pub struct MetadataCache {
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().unwrap().is_some()
    }

    pub fn loaded_db_name(&self) -> Option<String> {
        self.snapshot
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.db_name.clone())
    }

    /// No-op if `db_name` is already the loaded tenant.
    pub async fn load_for_tenant(&self, db_name: &str, db: &DbManager) -> AppResult<()> {
        if self.loaded_db_name().as_deref() == Some(db_name) {
            return Ok(());
        }
        self.refresh(db_name, db).await
    }

    /// Unconditionally reloads the cache for `db_name`.
    pub async fn refresh(&self, db_name: &str, db: &DbManager) -> AppResult<()> {
        let tenant_pool = db.tenant_pool(db_name).await?;
        let snapshot = load_snapshot(db_name, &tenant_pool, db.global_pool()).await?;
        *self.snapshot.write().unwrap() = Some(Arc::new(snapshot));
        tracing::info!("metadata cache loaded for tenant db '{db_name}'");
        Ok(())
    }

    fn snapshot(&self) -> AppResult<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::SourceUnavailable("metadata cache not loaded".into()))
    }

    pub fn get_production_lines(&self) -> AppResult<Vec<ProductionLine>> {
        Ok(self.snapshot()?.lines.values().cloned().collect())
    }

    pub fn get_active_production_lines(&self) -> AppResult<Vec<ProductionLine>> {
        Ok(self
            .snapshot()?
            .lines
            .values()
            .filter(|l| l.is_active)
            .cloned()
            .collect())
    }

    pub fn get_production_line(&self, line_id: i64) -> AppResult<Option<ProductionLine>> {
        Ok(self.snapshot()?.lines.get(&line_id).cloned())
    }

    pub fn get_areas_by_line(&self, line_id: i64) -> AppResult<Vec<Area>> {
        let snap = self.snapshot()?;
        Ok(snap
            .areas_by_line
            .get(&line_id)
            .map(|ids| ids.iter().filter_map(|id| snap.areas.get(id).cloned()).collect())
            .unwrap_or_default())
    }

    pub fn get_area(&self, area_id: i64) -> AppResult<Option<Area>> {
        Ok(self.snapshot()?.areas.get(&area_id).cloned())
    }

    pub fn get_all_areas(&self) -> AppResult<Vec<Area>> {
        Ok(self.snapshot()?.areas.values().cloned().collect())
    }

    pub fn get_product(&self, product_id: i64) -> AppResult<Option<Product>> {
        Ok(self.snapshot()?.products.get(&product_id).cloned())
    }

    pub fn get_all_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.snapshot()?.products.values().cloned().collect())
    }

    pub fn get_shift(&self, shift_id: i64) -> AppResult<Option<Shift>> {
        Ok(self.snapshot()?.shifts.get(&shift_id).cloned())
    }

    pub fn get_active_shifts(&self) -> AppResult<Vec<Shift>> {
        Ok(self.snapshot()?.shifts.values().cloned().collect())
    }

    pub fn get_filters(&self) -> AppResult<Vec<FilterRow>> {
        Ok(self.snapshot()?.filters.clone())
    }

    pub fn get_filter(&self, filter_id: i64) -> AppResult<Option<FilterRow>> {
        Ok(self
            .snapshot()?
            .filters
            .iter()
            .find(|f| f.filter_id == filter_id)
            .cloned())
    }

    pub fn get_failure(&self, failure_id: i64) -> AppResult<Option<Failure>> {
        Ok(self.snapshot()?.failures.get(&failure_id).cloned())
    }

    pub fn get_failures(&self) -> AppResult<HashMap<i64, Failure>> {
        Ok(self.snapshot()?.failures.clone())
    }

    pub fn get_incident(&self, incident_id: i64) -> AppResult<Option<Incident>> {
        Ok(self.snapshot()?.incidents.get(&incident_id).cloned())
    }

    pub fn get_incidents(&self) -> AppResult<HashMap<i64, Incident>> {
        Ok(self.snapshot()?.incidents.clone())
    }

    pub fn get_widget_catalog(&self) -> AppResult<HashMap<i64, WidgetCatalogEntry>> {
        Ok(self.snapshot()?.widget_catalog.clone())
    }

    pub fn get_widget_catalog_entry(&self, widget_id: i64) -> AppResult<Option<WidgetCatalogEntry>> {
        Ok(self.snapshot()?.widget_catalog.get(&widget_id).cloned())
    }

    /// Line groups declared across every filter row's `additional_filter`,
    /// keyed `group_{filter_id}` or `group_{filter_id}_{idx}`.
    pub fn get_line_groups(&self) -> AppResult<HashMap<String, LineGroup>> {
        let snap = self.snapshot()?;
        let mut groups = HashMap::new();
        for filter in &snap.filters {
            let Some(raw) = &filter.additional_filter else {
                continue;
            };
            parse_additional_filter(filter.filter_id, raw, &mut groups);
        }
        Ok(groups)
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the two accepted shapes of `additional_filter`:
/// `{alias, line_ids}` (single group, key `group_{fid}`) or
/// `{groups:[{alias, line_ids}, ...]}` (multi-group, keys
/// `group_{fid}_{idx}`).
fn parse_additional_filter(filter_id: i64, raw: &Value, out: &mut HashMap<String, LineGroup>) {
    if let Some(groups) = raw.get("groups").and_then(|g| g.as_array()) {
        for (idx, g) in groups.iter().enumerate() {
            if let Some(group) = parse_single_group(g) {
                out.insert(format!("group_{filter_id}_{idx}"), group);
            }
        }
        return;
    }

    if let Some(group) = parse_single_group(raw) {
        out.insert(format!("group_{filter_id}"), group);
    }
}

fn parse_single_group(v: &Value) -> Option<LineGroup> {
    let alias = v.get("alias")?.as_str()?.to_string();
    let line_ids = v
        .get("line_ids")?
        .as_array()?
        .iter()
        .filter_map(|x| x.as_i64())
        .collect();
    Some(LineGroup { alias, line_ids })
}

async fn load_snapshot(db_name: &str, tenant: &MySqlPool, global: &MySqlPool) -> AppResult<Snapshot> {
    let lines_rows = sqlx::query_as::<_, ProductionLineRow>(
        "SELECT line_id, line_name, line_code, is_active, performance, \
         downtime_threshold, auto_detect_downtime FROM production_line",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading production_line: {e}")))?;

    let areas_rows = sqlx::query_as::<_, AreaRow>(
        "SELECT area_id, line_id, area_name, area_type, area_order FROM area",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading area: {e}")))?;

    let products_rows = sqlx::query_as::<_, ProductRow>(
        "SELECT product_id, product_name, product_code, product_weight, \
         product_color, production_std FROM product",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading product: {e}")))?;

    let shifts_rows = sqlx::query_as::<_, ShiftRow>(
        "SELECT shift_id, shift_name, start_time, end_time, is_overnight, \
         days_implemented FROM shift WHERE shift_status = 1",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading shift: {e}")))?;

    let filters_rows = sqlx::query_as::<_, FilterRowRaw>(
        "SELECT filter_id, filter_name, description, filter_status, \
         display_order, additional_filter FROM filter \
         WHERE filter_status = 1 ORDER BY display_order",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading filter: {e}")))?;

    let failures_rows = sqlx::query_as::<_, Failure>(
        "SELECT failure_id, type_failure, description FROM failure",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading failure: {e}")))?;

    let incidents_rows = sqlx::query_as::<_, Incident>(
        "SELECT incident_id, failure_id, incident_code, description FROM incident",
    )
    .fetch_all(tenant)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading incident: {e}")))?;

    let catalog_rows = sqlx::query_as::<_, WidgetCatalogEntry>(
        "SELECT widget_id, widget_name, description FROM widget_catalog",
    )
    .fetch_all(global)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("loading widget_catalog: {e}")))?;

    let mut areas_by_line: HashMap<i64, Vec<i64>> = HashMap::new();
    for a in &areas_rows {
        areas_by_line.entry(a.line_id).or_default().push(a.area_id);
    }

    Ok(Snapshot {
        db_name: db_name.to_string(),
        lines: lines_rows.into_iter().map(|r| (r.line_id, r.into())).collect(),
        areas: areas_rows.into_iter().map(|r| (r.area_id, r.into())).collect(),
        areas_by_line,
        products: products_rows.into_iter().map(|r| (r.product_id, r)).collect(),
        shifts: shifts_rows.into_iter().map(|r| (r.shift_id, r.into())).collect(),
        filters: filters_rows.into_iter().map(Into::into).collect(),
        failures: failures_rows.into_iter().map(|r| (r.failure_id, r)).collect(),
        incidents: incidents_rows.into_iter().map(|r| (r.incident_id, r)).collect(),
        widget_catalog: catalog_rows.into_iter().map(|r| (r.widget_id, r)).collect(),
    })
}

// sqlx row shapes — kept distinct from the cache's public model types where
// the DB's native column types (e.g. MySQL TINYINT(1) booleans) need a
// conversion step.

#[derive(sqlx::FromRow)]
struct ProductionLineRow {
    line_id: i64,
    line_name: String,
    line_code: String,
    is_active: bool,
    performance: f64,
    downtime_threshold: i64,
    auto_detect_downtime: bool,
}

impl From<ProductionLineRow> for ProductionLine {
    fn from(r: ProductionLineRow) -> Self {
        ProductionLine {
            line_id: r.line_id,
            line_name: r.line_name,
            line_code: r.line_code,
            is_active: r.is_active,
            performance: r.performance,
            downtime_threshold: r.downtime_threshold,
            auto_detect_downtime: r.auto_detect_downtime,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AreaRow {
    area_id: i64,
    line_id: i64,
    area_name: String,
    area_type: String,
    area_order: i32,
}

impl From<AreaRow> for Area {
    fn from(r: AreaRow) -> Self {
        let area_type = match r.area_type.to_lowercase().as_str() {
            "input" => AreaType::Input,
            "output" => AreaType::Output,
            _ => AreaType::Process,
        };
        Area {
            area_id: r.area_id,
            line_id: r.line_id,
            area_name: r.area_name,
            area_type,
            area_order: r.area_order,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: i64,
    product_name: String,
    product_code: String,
    product_weight: f64,
    product_color: String,
    production_std: f64,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            product_id: r.product_id,
            product_name: r.product_name,
            product_code: r.product_code,
            product_weight: r.product_weight,
            product_color: r.product_color,
            production_std: r.production_std,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShiftRow {
    shift_id: i64,
    shift_name: String,
    start_time: String,
    end_time: String,
    is_overnight: bool,
    days_implemented: String,
}

impl From<ShiftRow> for Shift {
    fn from(r: ShiftRow) -> Self {
        Shift {
            shift_id: r.shift_id,
            shift_name: r.shift_name,
            start_time: r.start_time,
            end_time: r.end_time,
            is_overnight: r.is_overnight,
            days_implemented: r.days_implemented,
        }
    }
}

#[derive(sqlx::FromRow)]
struct FilterRowRaw {
    filter_id: i64,
    filter_name: String,
    description: String,
    filter_status: bool,
    display_order: i32,
    additional_filter: Option<String>,
}

impl From<FilterRowRaw> for FilterRow {
    fn from(r: FilterRowRaw) -> Self {
        FilterRow {
            filter_id: r.filter_id,
            filter_name: r.filter_name,
            description: r.description,
            filter_status: r.filter_status,
            display_order: r.display_order,
            additional_filter: r.additional_filter.and_then(|s| serde_json::from_str(&s).ok()),
        }
    }
}
