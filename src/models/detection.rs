use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A raw row as read off `detection_line_{name}`, before enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub detection_id: i64,
    pub detected_at: NaiveDateTime,
    pub area_id: i64,
    pub product_id: i64,
    pub line_id: i64,
}

/// One row of the master enriched result — the output of `enrich_detections`
/// and the input every widget processor consumes (after Data Scoping).
///
/// Unknown reference IDs are not dropped; they are enriched with sentinel
/// strings so every row always carries a full, consistent schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedDetection {
    pub detection_id: i64,
    pub detected_at: NaiveDateTime,
    pub area_id: i64,
    pub product_id: i64,
    pub line_id: i64,

    pub area_name: String,
    pub area_type: Option<String>,

    pub product_name: String,
    pub product_code: String,
    pub product_weight: f64,
    pub product_color: String,

    pub line_name: String,
    pub line_code: String,
}

impl EnrichedDetection {
    pub fn is_output(&self) -> bool {
        self.area_type.as_deref() == Some("output")
    }

    pub fn is_input(&self) -> bool {
        self.area_type.as_deref() == Some("input")
    }
}
