//! WidgetRegistry — the single code-embedded map describing every widget
//! class. Adding a widget means adding an entry here, a row in
//! `widget_catalog` referencing it by name, and a processor in
//! `crate::widgets` plus a dispatch arm in `crate::widgets::dispatch`.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetCategory {
    Kpi,
    Chart,
    Table,
    Ranking,
    Indicator,
    Summary,
    Feed,
}

impl WidgetCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetCategory::Kpi => "kpi",
            WidgetCategory::Chart => "chart",
            WidgetCategory::Table => "table",
            WidgetCategory::Ranking => "ranking",
            WidgetCategory::Indicator => "indicator",
            WidgetCategory::Summary => "summary",
            WidgetCategory::Feed => "feed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Internal,
    External,
}

#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub category: WidgetCategory,
    pub source_type: SourceType,
    pub required_columns: &'static [&'static str],
    pub api_source_id: Option<&'static str>,
    pub default_config: Value,
}

pub static WIDGET_REGISTRY: LazyLock<HashMap<&'static str, WidgetDescriptor>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(
        "KpiTotalProduction",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["area_type"],
            api_source_id: None,
            default_config: json!({ "unit": "unidades" }),
        },
    );
    m.insert(
        "KpiTotalWeight",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["area_type", "product_weight"],
            api_source_id: None,
            default_config: json!({ "unit": "kg" }),
        },
    );
    m.insert(
        "KpiOee",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["area_type", "detected_at", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "KpiTotalDowntime",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &[],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "KpiAvailability",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["detected_at", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "KpiPerformance",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["area_type", "detected_at", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "KpiQuality",
        WidgetDescriptor {
            category: WidgetCategory::Kpi,
            source_type: SourceType::Internal,
            required_columns: &["area_type", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );

    m.insert(
        "ProductionTimeChart",
        WidgetDescriptor {
            category: WidgetCategory::Chart,
            source_type: SourceType::Internal,
            required_columns: &["detected_at", "area_type", "line_id"],
            api_source_id: None,
            default_config: json!({ "curve_type": "smooth" }),
        },
    );
    m.insert(
        "AreaDetectionChart",
        WidgetDescriptor {
            category: WidgetCategory::Chart,
            source_type: SourceType::Internal,
            required_columns: &["detected_at", "area_type"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "ProductDistributionChart",
        WidgetDescriptor {
            category: WidgetCategory::Chart,
            source_type: SourceType::Internal,
            required_columns: &["product_name"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "EntryOutputCompareChart",
        WidgetDescriptor {
            category: WidgetCategory::Chart,
            source_type: SourceType::Internal,
            required_columns: &["detected_at", "area_type", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "ScatterChart",
        WidgetDescriptor {
            category: WidgetCategory::Chart,
            source_type: SourceType::Internal,
            required_columns: &[],
            api_source_id: None,
            default_config: json!({}),
        },
    );

    m.insert(
        "DowntimeTable",
        WidgetDescriptor {
            category: WidgetCategory::Table,
            source_type: SourceType::Internal,
            required_columns: &[],
            api_source_id: None,
            default_config: json!({}),
        },
    );

    m.insert(
        "ProductRanking",
        WidgetDescriptor {
            category: WidgetCategory::Ranking,
            source_type: SourceType::Internal,
            required_columns: &["product_name", "area_type"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "LineStatusIndicator",
        WidgetDescriptor {
            category: WidgetCategory::Indicator,
            source_type: SourceType::Internal,
            required_columns: &["line_id", "line_name"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "MetricsSummary",
        WidgetDescriptor {
            category: WidgetCategory::Summary,
            source_type: SourceType::Internal,
            required_columns: &["detected_at", "area_type", "line_id"],
            api_source_id: None,
            default_config: json!({}),
        },
    );
    m.insert(
        "EventFeed",
        WidgetDescriptor {
            category: WidgetCategory::Feed,
            source_type: SourceType::Internal,
            required_columns: &[],
            api_source_id: None,
            default_config: json!({ "max_items": 50 }),
        },
    );

    m
});

pub fn lookup(class_name: &str) -> Option<&'static WidgetDescriptor> {
    WIDGET_REGISTRY.get(class_name)
}
