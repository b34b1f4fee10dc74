//! Pure SQL clause builders — dynamic WHERE construction with `?`
//! positional bind values (MySQL placeholder style), no query
//! orchestration, no table resolution, no I/O.
//!
//! Every value collected here is bound through sqlx's parameter API, never
//! interpolated into the SQL text — the only string concatenation is of
//! column/table identifiers already constrained to the registry/cache.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;

#[derive(Debug, Clone)]
pub enum BindValue {
    I64(i64),
    Str(String),
    DateTime(NaiveDateTime),
}

pub type Params = Vec<BindValue>;

/// `table_name PARTITION (...)` or just `table_name`.
pub fn table_with_hint(table_name: &str, partition_hint: &str) -> String {
    if partition_hint.is_empty() {
        table_name.to_string()
    } else {
        format!("{table_name} {partition_hint}")
    }
}

/// Appends daterange, shift, area_ids, and product_ids clauses to `sql` in
/// one call, pushing their bind values onto `params` in placeholder order.
pub fn apply_filters(
    mut sql: String,
    params: &mut Params,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    time_column: &str,
    cache: &MetadataCache,
) -> AppResult<String> {
    sql = apply_daterange(sql, params, cleaned, time_column);

    if let Some(shift) = build_shift_clause(cleaned, params, time_column, cache)? {
        sql.push_str(" AND ");
        sql.push_str(&shift);
    }

    if let Some(areas) = build_in_clause(cleaned.get("area_ids").map(|f| &f.value), "area_id", params) {
        sql.push_str(" AND ");
        sql.push_str(&areas);
    }

    if let Some(products) = build_in_clause(cleaned.get("product_ids").map(|f| &f.value), "product_id", params) {
        sql.push_str(" AND ");
        sql.push_str(&products);
    }

    Ok(sql)
}

pub fn apply_daterange(
    mut sql: String,
    params: &mut Params,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    time_column: &str,
) -> String {
    let Some(daterange) = cleaned.get("daterange").map(|f| &f.value) else {
        return sql;
    };

    let (start, end) = parse_daterange(daterange);

    if let Some(start) = start {
        sql.push_str(&format!(" AND {time_column} >= ?"));
        params.push(BindValue::DateTime(start));
    }
    if let Some(end) = end {
        sql.push_str(&format!(" AND {time_column} <= ?"));
        params.push(BindValue::DateTime(end));
    }

    sql
}

/// Builds a `TIME(...)` clause for shift filtering, handling overnight
/// shifts (22:00→06:00, OR logic) and same-day shifts (AND logic).
pub fn build_shift_clause(
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    params: &mut Params,
    time_column: &str,
    cache: &MetadataCache,
) -> AppResult<Option<String>> {
    let Some(shift_id) = cleaned.get("shift_id").and_then(|f| f.value.as_i64()) else {
        return Ok(None);
    };

    let Some(shift) = cache.get_shift(shift_id)? else {
        tracing::warn!("sql_clauses: shift_id={shift_id} not in cache");
        return Ok(None);
    };

    let start = normalize_time(&shift.start_time);
    let end = normalize_time(&shift.end_time);

    let is_overnight = shift.is_overnight || end <= start;

    params.push(BindValue::Str(start.clone()));
    params.push(BindValue::Str(end.clone()));

    let clause = if is_overnight {
        format!("(TIME({time_column}) >= ? OR TIME({time_column}) < ?)")
    } else {
        format!("TIME({time_column}) >= ? AND TIME({time_column}) < ?")
    };
    Ok(Some(clause))
}

/// `column IN (?, ?, ...)`, or `None` if `values` is empty/absent.
pub fn build_in_clause(values: Option<&Value>, column: &str, params: &mut Params) -> Option<String> {
    let items = values?.as_array()?;
    if items.is_empty() {
        return None;
    }
    let placeholders: Vec<&str> = items
        .iter()
        .map(|v| {
            if let Some(i) = v.as_i64() {
                params.push(BindValue::I64(i));
            } else if let Some(s) = v.as_str() {
                params.push(BindValue::Str(s.to_string()));
            }
            "?"
        })
        .collect();
    Some(format!("{column} IN ({})", placeholders.join(", ")))
}

/// Parses a `{start_date, end_date, start_time?, end_time?}` JSON object
/// into `(start_datetime, end_datetime)`.
pub fn parse_daterange(daterange: &Value) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    let obj = daterange.as_object();
    let start = obj.and_then(|o| parse_bound(o.get("start_date"), o.get("start_time"), "00:00", 0));
    let end = obj.and_then(|o| parse_bound(o.get("end_date"), o.get("end_time"), "23:59", 59));
    (start, end)
}

fn parse_bound(
    date_value: Option<&Value>,
    time_value: Option<&Value>,
    default_time: &str,
    extra_seconds: u32,
) -> Option<NaiveDateTime> {
    let raw_date = date_value?.as_str()?;
    let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").ok()?;

    let raw_time = time_value.and_then(Value::as_str).unwrap_or(default_time);
    let mut parts = raw_time.split(':');
    let hour: u32 = parts.next()?.parse().ok()?;
    let minute: u32 = parts.next().unwrap_or("0").parse().ok()?;

    let time = NaiveTime::from_hms_opt(hour, minute, extra_seconds)?;
    Some(NaiveDateTime::new(date, time))
}

fn normalize_time(value: &str) -> String {
    // DB column is already "HH:MM:SS"; just trust the stored format.
    value.to_string()
}
