//! Application-side joins for raw detection rows — no DB queries, no I/O,
//! pure transformation against `MetadataCache`. Reused for both detection
//! and downtime enrichment since both need `line_name`.

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::models::{Detection, EnrichedDetection};

pub fn enrich_detections(rows: Vec<Detection>, cache: &MetadataCache) -> AppResult<Vec<EnrichedDetection>> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let area = cache.get_area(row.area_id)?;
        let product = cache.get_product(row.product_id)?;
        let line = cache.get_production_line(row.line_id)?;

        out.push(EnrichedDetection {
            detection_id: row.detection_id,
            detected_at: row.detected_at,
            area_id: row.area_id,
            product_id: row.product_id,
            line_id: row.line_id,

            area_name: area.as_ref().map(|a| a.area_name.clone()).unwrap_or_else(|| "Desconocida".to_string()),
            area_type: area.map(|a| a.area_type.as_str().to_string()),

            product_name: product.as_ref().map(|p| p.product_name.clone()).unwrap_or_else(|| "Desconocido".to_string()),
            product_code: product.as_ref().map(|p| p.product_code.clone()).unwrap_or_default(),
            product_weight: product.as_ref().map(|p| p.product_weight).unwrap_or(0.0),
            product_color: product.map(|p| p.product_color).unwrap_or_else(|| "#888888".to_string()),

            line_name: line.as_ref().map(|l| l.line_name.clone()).unwrap_or_else(|| "Desconocida".to_string()),
            line_code: line.map(|l| l.line_code).unwrap_or_default(),
        });
    }

    Ok(out)
}
