//! Maps `line_id` to the dynamic per-line table names, centralizing the
//! naming convention consumed by `query_builder`, the repositories, and the
//! detection/downtime services.

use crate::cache::MetadataCache;
use crate::error::AppResult;

/// `detection_line_{line_name.lower()}`, or `None` if the line is unknown.
pub fn detection_table(cache: &MetadataCache, line_id: i64) -> AppResult<Option<String>> {
    Ok(cache
        .get_production_line(line_id)?
        .map(|l| format!("detection_line_{}", l.line_name.to_lowercase())))
}

/// `downtime_events_{line_name.lower()}`, or `None` if the line is unknown.
pub fn downtime_table(cache: &MetadataCache, line_id: i64) -> AppResult<Option<String>> {
    Ok(cache
        .get_production_line(line_id)?
        .map(|l| format!("downtime_events_{}", l.line_name.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_line_resolves_to_none() {
        let cache = MetadataCache::new();
        // Not loaded: snapshot() errors before it ever reaches the map lookup.
        assert!(detection_table(&cache, 1).is_err());
    }
}
