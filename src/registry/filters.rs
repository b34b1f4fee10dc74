//! FilterRegistry — the single code-embedded map describing every filter
//! class known to the system. Adding a filter means adding a variant here,
//! a row in the tenant `filter` table referencing it by name, and a
//! processor in `crate::filters`. Nothing else changes.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    DateRange,
    Dropdown,
    Multiselect,
    Text,
    Number,
    Toggle,
}

#[derive(Debug, Clone)]
pub struct FilterDescriptor {
    pub filter_type: FilterType,
    pub param_name: &'static str,
    pub options_source: Option<&'static str>,
    pub default_value: Value,
    pub placeholder: Option<&'static str>,
    pub required: bool,
    pub depends_on: Option<&'static str>,
    pub ui_config: Value,
}

pub static FILTER_REGISTRY: LazyLock<HashMap<&'static str, FilterDescriptor>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "DateRangeFilter",
        FilterDescriptor {
            filter_type: FilterType::DateRange,
            param_name: "daterange",
            options_source: None,
            default_value: Value::Null,
            placeholder: None,
            required: true,
            depends_on: None,
            ui_config: json!({
                "show_time": true,
                "default_start_time": "00:00",
                "default_end_time": "23:59",
            }),
        },
    );

    m.insert(
        "ProductionLineFilter",
        FilterDescriptor {
            filter_type: FilterType::Dropdown,
            param_name: "line_id",
            options_source: Some("production_lines"),
            default_value: Value::Null,
            placeholder: Some("Seleccionar línea"),
            required: true,
            depends_on: None,
            ui_config: json!({ "supports_groups": true }),
        },
    );

    m.insert(
        "ShiftFilter",
        FilterDescriptor {
            filter_type: FilterType::Dropdown,
            param_name: "shift_id",
            options_source: Some("shifts"),
            default_value: Value::Null,
            placeholder: Some("Todos los turnos"),
            required: false,
            depends_on: None,
            ui_config: json!({}),
        },
    );

    m.insert(
        "AreaFilter",
        FilterDescriptor {
            filter_type: FilterType::Multiselect,
            param_name: "area_ids",
            options_source: Some("areas"),
            default_value: json!([]),
            placeholder: Some("Todas las áreas"),
            required: false,
            depends_on: Some("line_id"),
            ui_config: json!({}),
        },
    );

    m.insert(
        "ProductFilter",
        FilterDescriptor {
            filter_type: FilterType::Multiselect,
            param_name: "product_ids",
            options_source: Some("products"),
            default_value: json!([]),
            placeholder: Some("Todos los productos"),
            required: false,
            depends_on: None,
            ui_config: json!({}),
        },
    );

    m.insert(
        "IntervalFilter",
        FilterDescriptor {
            filter_type: FilterType::Dropdown,
            param_name: "interval",
            options_source: None,
            default_value: json!("hour"),
            placeholder: None,
            required: true,
            depends_on: None,
            ui_config: json!({
                "static_options": [
                    { "value": "hour", "label": "Por hora" },
                    { "value": "day", "label": "Por día" },
                    { "value": "week", "label": "Por semana" },
                    { "value": "month", "label": "Por mes" },
                ]
            }),
        },
    );

    m.insert(
        "CurveTypeFilter",
        FilterDescriptor {
            filter_type: FilterType::Dropdown,
            param_name: "curve_type",
            options_source: None,
            default_value: json!("smooth"),
            placeholder: None,
            required: false,
            depends_on: None,
            ui_config: json!({
                "static_options": [
                    { "value": "smooth", "label": "Suavizado" },
                    { "value": "linear", "label": "Lineal" },
                    { "value": "stepped", "label": "Escalonado" },
                    { "value": "stacked", "label": "Apilado" },
                ]
            }),
        },
    );

    m.insert(
        "DowntimeThresholdFilter",
        FilterDescriptor {
            filter_type: FilterType::Number,
            param_name: "downtime_threshold",
            options_source: None,
            default_value: json!(300),
            placeholder: Some("Segundos"),
            required: false,
            depends_on: Some("line_id"),
            ui_config: json!({ "min": 0, "step": 10, "unit": "s" }),
        },
    );

    m.insert(
        "ShowDowntimeFilter",
        FilterDescriptor {
            filter_type: FilterType::Toggle,
            param_name: "show_downtime",
            options_source: None,
            default_value: json!(true),
            placeholder: None,
            required: false,
            depends_on: None,
            ui_config: json!({ "label": "Mostrar paradas" }),
        },
    );

    m.insert(
        "SearchFilter",
        FilterDescriptor {
            filter_type: FilterType::Text,
            param_name: "search",
            options_source: None,
            default_value: json!(""),
            placeholder: Some("Buscar…"),
            required: false,
            depends_on: None,
            ui_config: json!({ "debounce_ms": 300 }),
        },
    );

    m
});

pub fn lookup(class_name: &str) -> Option<&'static FilterDescriptor> {
    FILTER_REGISTRY.get(class_name)
}
