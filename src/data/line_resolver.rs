//! Resolves the concrete list of production line IDs named by the
//! `line_id` / `line_ids` cleaned filter values.
//!
//! Priority: explicit `line_ids` list/CSV → `line_id` (`"all"`, `group_*`,
//! or a bare integer) → fallback to every active line.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;

pub fn resolve(cleaned: &HashMap<&'static str, ResolvedFilter>, cache: &MetadataCache) -> AppResult<Vec<i64>> {
    if let Some(f) = cleaned.get("line_ids") {
        if let Some(ids) = parse_explicit_list(&f.value) {
            if !ids.is_empty() {
                return Ok(ids);
            }
        }
    }

    let Some(f) = cleaned.get("line_id") else {
        return cache.get_active_production_lines().map(|v| v.into_iter().map(|l| l.line_id).collect());
    };

    resolve_line_id_value(&f.value, cache)
}

fn parse_explicit_list(value: &Value) -> Option<Vec<i64>> {
    match value {
        Value::Array(items) => Some(items.iter().filter_map(Value::as_i64).collect()),
        Value::String(s) => Some(s.split(',').filter_map(|p| p.trim().parse::<i64>().ok()).collect()),
        _ => None,
    }
}

fn resolve_line_id_value(value: &Value, cache: &MetadataCache) -> AppResult<Vec<i64>> {
    let active = || cache.get_active_production_lines().map(|v| v.into_iter().map(|l| l.line_id).collect::<Vec<_>>());

    if value.is_null() {
        return active();
    }

    if let Some(s) = value.as_str() {
        if s == "all" {
            return active();
        }
        if let Some(rest) = s.strip_prefix("group_") {
            return resolve_group(rest, cache);
        }
        if let Ok(id) = s.parse::<i64>() {
            return Ok(vec![id]);
        }
        tracing::warn!("LineResolver: cannot parse line_id={s}");
        return active();
    }

    if let Some(id) = value.as_i64() {
        return Ok(vec![id]);
    }

    active()
}

fn resolve_group(rest: &str, cache: &MetadataCache) -> AppResult<Vec<i64>> {
    let active = || cache.get_active_production_lines().map(|v| v.into_iter().map(|l| l.line_id).collect::<Vec<_>>());
    let groups = cache.get_line_groups()?;

    let parts: Vec<&str> = rest.split('_').collect();
    let key = match parts.as_slice() {
        [fid] => format!("group_{fid}"),
        [fid, idx] => format!("group_{fid}_{idx}"),
        _ => return active(),
    };

    match groups.get(&key) {
        Some(group) => Ok(group.line_ids.clone()),
        None => active(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(value: Value) -> ResolvedFilter {
        ResolvedFilter {
            filter_id: 1,
            filter_name: "ProductionLineFilter".to_string(),
            param_name: "line_id",
            value,
        }
    }

    #[test]
    fn explicit_csv_list_wins_over_line_id() {
        let mut cleaned = HashMap::new();
        cleaned.insert("line_ids", filter(json!("1, 2, 3")));
        cleaned.insert("line_id", filter(json!(99)));
        let cache = MetadataCache::new();
        let ids = resolve(&cleaned, &cache).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn bare_integer_line_id_resolves_to_single_line() {
        let mut cleaned = HashMap::new();
        cleaned.insert("line_id", filter(json!(7)));
        let cache = MetadataCache::new();
        let ids = resolve(&cleaned, &cache).unwrap();
        assert_eq!(ids, vec![7]);
    }
}
