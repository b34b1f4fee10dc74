use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A production line, keyed by `line_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionLine {
    pub line_id: i64,
    pub line_name: String,
    pub line_code: String,
    pub is_active: bool,
    /// Units produced per minute when running at nominal rate.
    pub performance: f64,
    pub downtime_threshold: i64,
    pub auto_detect_downtime: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Input,
    Output,
    Process,
}

impl AreaType {
    pub fn as_str(self) -> &'static str {
        match self {
            AreaType::Input => "input",
            AreaType::Output => "output",
            AreaType::Process => "process",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub area_id: i64,
    pub line_id: i64,
    pub area_name: String,
    pub area_type: AreaType,
    pub area_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub product_id: i64,
    pub product_name: String,
    pub product_code: String,
    pub product_weight: f64,
    pub product_color: String,
    pub production_std: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub shift_id: i64,
    pub shift_name: String,
    /// Local time-of-day, "HH:MM:SS".
    pub start_time: String,
    pub end_time: String,
    pub is_overnight: bool,
    pub days_implemented: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRow {
    pub filter_id: i64,
    /// Matches a key in the filter registry.
    pub filter_name: String,
    pub description: String,
    pub filter_status: bool,
    pub display_order: i32,
    pub additional_filter: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Failure {
    pub failure_id: i64,
    pub type_failure: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Incident {
    pub incident_id: i64,
    pub failure_id: i64,
    pub incident_code: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WidgetCatalogEntry {
    pub widget_id: i64,
    /// Matches a key in the widget registry.
    pub widget_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardTemplate {
    pub template_id: i64,
    pub tenant_id: i64,
    pub role_access: String,
    pub layout_config: Value,
}

/// A named alias over a subset of line_ids, parsed out of a
/// `FilterRow::additional_filter` blob.
#[derive(Debug, Clone)]
pub struct LineGroup {
    pub alias: String,
    pub line_ids: Vec<i64>,
}
