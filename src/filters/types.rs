//! Concrete filter-type validators and option loaders.
//!
//! The source instantiates one Python class per `filter_type` via dynamic
//! import. Here the six types are a closed set (`FilterType` in
//! `crate::registry::filters`), so a plain `match` over the enum is the
//! dispatch table — no trait objects needed, equivalent power, zero
//! reflection.

use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::registry::filters::FilterDescriptor;

#[derive(Debug, Clone, serde::Serialize)]
pub struct FilterOption {
    pub value: Value,
    pub label: String,
}

/// Runs `descriptor.filter_type`'s validation rule against `raw`, falling
/// back to the descriptor's default when `raw` is `None`.
///
/// Returns `Ok(cleaned_value)` or `Err(message)` — never panics on bad
/// user input, matching the "Validation" category in the error taxonomy.
pub fn validate(descriptor: &FilterDescriptor, raw: Option<&Value>) -> Result<Value, String> {
    use crate::registry::filters::FilterType::*;

    let value = raw.cloned().unwrap_or_else(|| descriptor.default_value.clone());

    match descriptor.filter_type {
        DateRange => validate_daterange(&value),
        Dropdown => validate_dropdown(&value, descriptor),
        Multiselect => validate_multiselect(&value, descriptor),
        Text => validate_text(&value, descriptor),
        Number => validate_number(&value, descriptor),
        Toggle => validate_toggle(&value),
    }
}

fn validate_daterange(value: &Value) -> Result<Value, String> {
    if value.is_null() {
        return Err("daterange is required".to_string());
    }
    let obj = value.as_object().ok_or("daterange must be an object")?;

    let start_date = obj
        .get("start_date")
        .and_then(Value::as_str)
        .ok_or("start_date is required")?;
    let end_date = obj
        .get("end_date")
        .and_then(Value::as_str)
        .ok_or("end_date is required")?;

    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| format!("invalid start_date: {start_date}"))?;
    let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
        .map_err(|_| format!("invalid end_date: {end_date}"))?;

    if start > end {
        return Err("start_date must not be after end_date".to_string());
    }

    let start_time = obj.get("start_time").and_then(Value::as_str).unwrap_or("00:00");
    let end_time = obj.get("end_time").and_then(Value::as_str).unwrap_or("23:59");

    NaiveTime::parse_from_str(start_time, "%H:%M")
        .map_err(|_| format!("invalid start_time: {start_time}"))?;
    NaiveTime::parse_from_str(end_time, "%H:%M")
        .map_err(|_| format!("invalid end_time: {end_time}"))?;

    if start == end && start_time > end_time {
        return Err("start_time must not be after end_time on a single-day range".to_string());
    }

    Ok(json!({
        "start_date": start_date,
        "end_date": end_date,
        "start_time": start_time,
        "end_time": end_time,
    }))
}

fn validate_dropdown(value: &Value, descriptor: &FilterDescriptor) -> Result<Value, String> {
    if value.is_null() {
        if descriptor.required {
            return Err("a value is required".to_string());
        }
        return Ok(Value::Null);
    }
    // Option-membership is checked against the live cache by the caller
    // (FilterEngine::validate_input), since it requires cache access this
    // pure function doesn't have. Shape validation only: must be a scalar.
    if value.is_object() || value.is_array() {
        return Err("expected a single value".to_string());
    }
    Ok(value.clone())
}

fn validate_multiselect(value: &Value, descriptor: &FilterDescriptor) -> Result<Value, String> {
    let arr = match value {
        Value::Null => return Ok(json!([])),
        Value::Array(a) => a,
        _ => return Err("expected a list of values".to_string()),
    };
    if arr.is_empty() && descriptor.required {
        return Err("at least one value is required".to_string());
    }
    Ok(Value::Array(arr.clone()))
}

fn validate_text(value: &Value, descriptor: &FilterDescriptor) -> Result<Value, String> {
    let s = match value {
        Value::Null => return Ok(descriptor.default_value.clone()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if let Some(max_len) = descriptor.ui_config.get("max_length").and_then(Value::as_u64) {
        if s.len() as u64 > max_len {
            return Err(format!("must be at most {max_len} characters"));
        }
    }
    if let Some(min_len) = descriptor.ui_config.get("min_length").and_then(Value::as_u64) {
        if (s.len() as u64) < min_len {
            return Err(format!("must be at least {min_len} characters"));
        }
    }
    Ok(Value::String(s))
}

fn validate_number(value: &Value, descriptor: &FilterDescriptor) -> Result<Value, String> {
    let n = match value {
        Value::Null => return Ok(descriptor.default_value.clone()),
        Value::Number(n) => n.as_f64().ok_or("invalid number")?,
        Value::String(s) => s.parse::<f64>().map_err(|_| format!("invalid number: {s}"))?,
        _ => return Err("expected a number".to_string()),
    };
    if let Some(min) = descriptor.ui_config.get("min").and_then(Value::as_f64) {
        if n < min {
            return Err(format!("must be >= {min}"));
        }
    }
    if let Some(max) = descriptor.ui_config.get("max").and_then(Value::as_f64) {
        if n > max {
            return Err(format!("must be <= {max}"));
        }
    }
    Ok(json!(n))
}

fn validate_toggle(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Bool(true)),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Value::Bool(true)),
            "false" | "0" | "no" => Ok(Value::Bool(false)),
            _ => Err(format!("invalid boolean: {s}")),
        },
        Value::Number(n) => Ok(Value::Bool(n.as_i64().unwrap_or(0) != 0)),
        _ => Err("expected a boolean".to_string()),
    }
}

/// Loads the option list for a dropdown/multiselect filter whose
/// `options_source` names a cache collection, augmented for
/// `production_lines` with synthetic line-group and "all" options.
pub fn load_options(
    source: &str,
    cache: &MetadataCache,
    owning_filter_id: i64,
) -> AppResult<Vec<FilterOption>> {
    match source {
        "production_lines" => load_production_line_options(cache, owning_filter_id),
        "shifts" => Ok(cache
            .get_active_shifts()?
            .into_iter()
            .map(|s| FilterOption {
                value: json!(s.shift_id),
                label: s.shift_name,
            })
            .collect()),
        "areas" => Ok(cache
            .get_all_areas()?
            .into_iter()
            .map(|a| FilterOption {
                value: json!(a.area_id),
                label: a.area_name,
            })
            .collect()),
        "products" => Ok(cache
            .get_all_products()?
            .into_iter()
            .map(|p| FilterOption {
                value: json!(p.product_id),
                label: p.product_name,
            })
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn load_production_line_options(cache: &MetadataCache, _owning_filter_id: i64) -> AppResult<Vec<FilterOption>> {
    let lines = cache.get_active_production_lines()?;
    let mut options: Vec<FilterOption> = lines
        .iter()
        .map(|l| FilterOption {
            value: json!(l.line_id),
            label: l.line_name.clone(),
        })
        .collect();

    if lines.len() > 1 {
        options.push(FilterOption {
            value: json!("all"),
            label: "Todas las líneas".to_string(),
        });
    }

    for (key, group) in cache.get_line_groups()? {
        options.push(FilterOption {
            value: json!(key),
            label: group.alias,
        });
    }

    Ok(options)
}
