//! Admin surface: metadata cache lifecycle, health, and partition
//! maintenance — the operational controls a cron job or operator hits
//! from outside the request path.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use crate::data::partition_manager;
use crate::error::AppResult;
use crate::AppState;

pub async fn load_cache(State(state): State<AppState>, Path(db_name): Path<String>) -> AppResult<impl IntoResponse> {
    state.cache.load_for_tenant(&db_name, &state.db).await?;
    Ok(Json(json!({ "loaded": true, "db_name": db_name })))
}

pub async fn refresh_cache(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let db_name = state
        .cache
        .loaded_db_name()
        .ok_or_else(|| crate::error::AppError::SourceUnavailable("no tenant loaded yet".to_string()))?;
    state.cache.refresh(&db_name, &state.db).await?;
    Ok(Json(json!({ "refreshed": true, "db_name": db_name })))
}

pub async fn cache_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "loaded": state.cache.is_loaded(),
        "db_name": state.cache.loaded_db_name(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "cache_loaded": state.cache.is_loaded(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReferenceDateQuery {
    pub reference_date: Option<String>,
}

pub async fn ensure_partitions(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(q): Query<ReferenceDateQuery>,
) -> AppResult<impl IntoResponse> {
    let db_name = state
        .cache
        .loaded_db_name()
        .ok_or_else(|| crate::error::AppError::SourceUnavailable("no tenant loaded yet".to_string()))?;
    let pool = state.db.tenant_pool(&db_name).await?;
    let reference_date = parse_reference_date(q.reference_date);

    let created = partition_manager::ensure_partitions(&pool, &table, state.config.partitions.months_ahead as i32, reference_date).await?;
    Ok(Json(json!({ "table": table, "created": created })))
}

pub async fn drop_old_partitions(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(q): Query<ReferenceDateQuery>,
) -> AppResult<impl IntoResponse> {
    let db_name = state
        .cache
        .loaded_db_name()
        .ok_or_else(|| crate::error::AppError::SourceUnavailable("no tenant loaded yet".to_string()))?;
    let pool = state.db.tenant_pool(&db_name).await?;
    let reference_date = parse_reference_date(q.reference_date);

    let dropped = partition_manager::drop_old_partitions(&pool, &table, state.config.partitions.retention_months as i32, reference_date).await?;
    Ok(Json(json!({ "table": table, "dropped": dropped })))
}

pub async fn list_partitions(State(state): State<AppState>, Path(table): Path<String>) -> AppResult<impl IntoResponse> {
    let db_name = state
        .cache
        .loaded_db_name()
        .ok_or_else(|| crate::error::AppError::SourceUnavailable("no tenant loaded yet".to_string()))?;
    let pool = state.db.tenant_pool(&db_name).await?;
    let partitions = partition_manager::get_existing_partitions(&pool, &table).await?;
    Ok(Json(json!({ "table": table, "partitions": partitions })))
}

fn parse_reference_date(raw: Option<String>) -> chrono::NaiveDate {
    raw.as_deref()
        .and_then(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Local::now().date_naive())
}
