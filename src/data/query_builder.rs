//! Composes complete parameterized SQL for detection and downtime tables.
//!
//! Does NOT resolve table names or line IDs (see `table_resolver` and
//! `line_resolver`). All clause-level logic lives in `sql_clauses`.

use std::collections::HashMap;

use crate::cache::MetadataCache;
use crate::error::AppResult;
use crate::filters::ResolvedFilter;

use super::sql_clauses::{apply_daterange, apply_filters, build_shift_clause, table_with_hint, BindValue, Params};

pub const DETECTION_COLUMNS: &str = "detection_id, detected_at, area_id, product_id";
pub const DEFAULT_DETECTION_BATCH_SIZE: i64 = 500_000;
pub const DEFAULT_DOWNTIME_BATCH_SIZE: i64 = 10_000;

pub type QueryResult = (String, Params);

pub fn build_detection_query(
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cursor_id: i64,
    limit: i64,
    partition_hint: &str,
    cache: &MetadataCache,
) -> AppResult<QueryResult> {
    let table_ref = table_with_hint(table_name, partition_hint);
    let mut sql = format!("SELECT {DETECTION_COLUMNS} FROM {table_ref} WHERE detection_id > ?");
    let mut params: Params = vec![BindValue::I64(cursor_id)];

    sql = apply_filters(sql, &mut params, cleaned, "detected_at", cache)?;
    sql.push_str(&format!(" ORDER BY detection_id LIMIT {limit}"));

    Ok((sql, params))
}

pub fn build_detection_count_query(
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    partition_hint: &str,
    cache: &MetadataCache,
) -> AppResult<QueryResult> {
    let table_ref = table_with_hint(table_name, partition_hint);
    let sql = format!("SELECT COUNT(*) AS total FROM {table_ref} WHERE 1=1");
    let mut params: Params = Vec::new();

    let sql = apply_filters(sql, &mut params, cleaned, "detected_at", cache)?;
    Ok((sql, params))
}

pub fn build_aggregation_query(
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    group_column: &str,
    agg_func: &str,
    agg_column: &str,
    partition_hint: &str,
    cache: &MetadataCache,
) -> AppResult<QueryResult> {
    let table_ref = table_with_hint(table_name, partition_hint);
    let sql = format!(
        "SELECT {group_column}, {agg_func}({agg_column}) AS value FROM {table_ref} WHERE 1=1"
    );
    let mut params: Params = Vec::new();

    let mut sql = apply_filters(sql, &mut params, cleaned, "detected_at", cache)?;
    sql.push_str(&format!(" GROUP BY {group_column}"));
    Ok((sql, params))
}

pub const DOWNTIME_COLUMNS: &str = "event_id, last_detection_id, start_time, end_time, \
    duration_seconds, reason_code, reason, is_manual, created_at";

pub fn build_downtime_query(
    table_name: &str,
    cleaned: &HashMap<&'static str, ResolvedFilter>,
    cursor_id: i64,
    limit: i64,
    cache: &MetadataCache,
) -> AppResult<QueryResult> {
    let mut sql = format!("SELECT {DOWNTIME_COLUMNS} FROM {table_name} WHERE event_id > ?");
    let mut params: Params = vec![BindValue::I64(cursor_id)];

    sql = apply_daterange(sql, &mut params, cleaned, "start_time");

    if let Some(shift) = build_shift_clause(cleaned, &mut params, "start_time", cache)? {
        sql.push_str(" AND ");
        sql.push_str(&shift);
    }

    sql.push_str(&format!(" ORDER BY event_id LIMIT {limit}"));
    Ok((sql, params))
}
