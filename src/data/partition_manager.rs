//! Monthly RANGE partition maintenance for `detection_line_*` and
//! `downtime_events_*` tables.
//!
//! MySQL RANGE partitioning on `YEAR(detected_at)*100 + MONTH(detected_at)`
//! lets the query engine prune months outside the caller's date range.
//! This module only adds/removes/lists partitions on tables that the DBA
//! has already partitioned — it never creates the tables themselves.
//!
//! Partition naming: `p{YYYYMM}` (e.g. `p202601`), plus a catch-all `pmax`
//! with `VALUES LESS THAN MAXVALUE`.

use chrono::{Datelike, NaiveDate};
use sqlx::MySqlPool;

use crate::error::{AppError, AppResult};

pub async fn get_existing_partitions(pool: &MySqlPool, table_name: &str) -> AppResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT PARTITION_NAME FROM INFORMATION_SCHEMA.PARTITIONS \
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND PARTITION_NAME IS NOT NULL \
         ORDER BY PARTITION_ORDINAL_POSITION",
    )
    .bind(table_name)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::SourceUnavailable(format!("listing partitions for {table_name}: {e}")))?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}

pub async fn is_partitioned(pool: &MySqlPool, table_name: &str) -> AppResult<bool> {
    Ok(!get_existing_partitions(pool, table_name).await?.is_empty())
}

/// Guarantees partitions exist from the current month through
/// `months_ahead` months into the future. No-op (with a warning) if the
/// table isn't partitioned yet — the DBA must ALTER TABLE first.
///
/// Returns the names of newly created partitions.
pub async fn ensure_partitions(
    pool: &MySqlPool,
    table_name: &str,
    months_ahead: i32,
    reference_date: NaiveDate,
) -> AppResult<Vec<String>> {
    let existing = get_existing_partitions(pool, table_name).await?;
    if existing.is_empty() {
        tracing::warn!("{table_name} has no partitions — cannot ensure; DBA must partition the table first");
        return Ok(Vec::new());
    }

    let has_pmax = existing.iter().any(|p| p == "pmax");
    let needed = partitions_for_range(reference_date, months_ahead);
    let existing_set: std::collections::HashSet<_> = existing.into_iter().collect();

    let mut created = Vec::new();
    for (part_name, boundary) in needed {
        if existing_set.contains(&part_name) {
            continue;
        }

        if has_pmax {
            reorganize_pmax(pool, table_name, &part_name, boundary).await?;
        } else {
            add_partition(pool, table_name, &part_name, boundary).await?;
        }
        tracing::info!("created {part_name} on {table_name}");
        created.push(part_name);
    }

    Ok(created)
}

/// Drops partitions older than `retention_months`, returning the names of
/// the partitions dropped.
pub async fn drop_old_partitions(
    pool: &MySqlPool,
    table_name: &str,
    retention_months: i32,
    reference_date: NaiveDate,
) -> AppResult<Vec<String>> {
    let cutoff_raw = reference_date.year() * 100 + reference_date.month() as i32 - retention_months;
    let mut cutoff_year = cutoff_raw / 100;
    let mut cutoff_month = cutoff_raw % 100;
    if cutoff_month <= 0 {
        cutoff_year -= 1;
        cutoff_month += 12;
    }
    let cutoff = cutoff_year * 100 + cutoff_month;

    let existing = get_existing_partitions(pool, table_name).await?;
    let mut dropped = Vec::new();

    for part_name in existing {
        if part_name == "pmax" {
            continue;
        }
        let Ok(yyyymm) = part_name.trim_start_matches('p').parse::<i32>() else {
            continue;
        };
        if yyyymm < cutoff {
            drop_partition(pool, table_name, &part_name).await?;
            tracing::info!("dropped {part_name} from {table_name} (older than {retention_months} months)");
            dropped.push(part_name);
        }
    }

    Ok(dropped)
}

/// `PARTITION (p202601, p202602, ...)` for `query_builder`'s partition
/// pruning hint. Empty if the range spans more than 12 months (too long
/// a hint to help) or has no resolvable bounds.
pub fn partition_hint(start_date: NaiveDate, end_date: NaiveDate) -> String {
    let names = partition_names_for_range(start_date, end_date);
    if names.is_empty() || names.len() > 12 {
        return String::new();
    }
    format!("PARTITION ({})", names.join(", "))
}

fn partitions_for_range(reference_date: NaiveDate, months_ahead: i32) -> Vec<(String, i32)> {
    let mut result = Vec::new();
    let mut current = reference_date.with_day(1).unwrap();

    for _ in 0..=months_ahead {
        let part_name = format!("p{}{:02}", current.year(), current.month());
        let next = next_month(current);
        let boundary = next.year() * 100 + next.month() as i32;
        result.push((part_name, boundary));
        current = next;
    }

    result
}

fn partition_names_for_range(start_date: NaiveDate, end_date: NaiveDate) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = start_date.with_day(1).unwrap();
    while current <= end_date {
        names.push(format!("p{}{:02}", current.year(), current.month()));
        current = next_month(current);
    }
    names
}

fn next_month(d: NaiveDate) -> NaiveDate {
    if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1).unwrap()
    }
}

async fn reorganize_pmax(pool: &MySqlPool, table_name: &str, part_name: &str, boundary: i32) -> AppResult<()> {
    let sql = format!(
        "ALTER TABLE {table_name} REORGANIZE PARTITION pmax INTO ( \
         PARTITION {part_name} VALUES LESS THAN ({boundary}), \
         PARTITION pmax VALUES LESS THAN MAXVALUE )"
    );
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Processing(format!("reorganizing partition on {table_name}: {e}")))?;
    Ok(())
}

async fn add_partition(pool: &MySqlPool, table_name: &str, part_name: &str, boundary: i32) -> AppResult<()> {
    let sql = format!("ALTER TABLE {table_name} ADD PARTITION (PARTITION {part_name} VALUES LESS THAN ({boundary}))");
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Processing(format!("adding partition on {table_name}: {e}")))?;
    Ok(())
}

async fn drop_partition(pool: &MySqlPool, table_name: &str, part_name: &str) -> AppResult<()> {
    let sql = format!("ALTER TABLE {table_name} DROP PARTITION {part_name}");
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Processing(format!("dropping partition on {table_name}: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_spans_exactly_the_requested_months() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(partition_hint(start, end), "PARTITION (p202601, p202602, p202603)");
    }

    #[test]
    fn hint_empty_beyond_twelve_months() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(partition_hint(start, end), "");
    }
}
