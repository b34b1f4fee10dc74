//! Diagnostics surface over the detection pipeline: `GET
//! /detections/{line_id}`, `POST /detections/query|count|summary|export`.
//!
//! Not part of the widget-facing dashboard contract — these exist for
//! manual inspection and frontend debugging tooling.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::data::{detection_service, line_resolver};
use crate::error::AppResult;
use crate::filters::FilterEngine;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DetectionsBody {
    #[serde(flatten)]
    pub params: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub async fn get_line_detections(State(state): State<AppState>, Path(line_id): Path<i64>) -> AppResult<impl IntoResponse> {
    let db_name = require_db(&state)?;
    let pool = state.db.tenant_pool(&db_name).await?;
    let cleaned = FilterEngine::new(&state.cache).resolve_all(&HashMap::new())?;

    let detections = detection_service::get_enriched_detections(&pool, &[line_id], &cleaned, true, &state.cache).await?;
    Ok(Json(json!({ "line_id": line_id, "count": detections.len(), "detections": detections })))
}

pub async fn query_detections(State(state): State<AppState>, Json(body): Json<DetectionsBody>) -> AppResult<impl IntoResponse> {
    let (pool, line_ids, cleaned) = resolve(&state, &body.params).await?;
    let detections = detection_service::get_enriched_detections(&pool, &line_ids, &cleaned, true, &state.cache).await?;
    Ok(Json(json!({ "lines_queried": line_ids, "count": detections.len(), "detections": detections })))
}

pub async fn count_detections(State(state): State<AppState>, Json(body): Json<DetectionsBody>) -> AppResult<impl IntoResponse> {
    let (pool, line_ids, cleaned) = resolve(&state, &body.params).await?;
    let count = detection_service::get_detection_count(&pool, &line_ids, &cleaned, &state.cache).await?;
    Ok(Json(json!({ "total": count.total, "per_line": count.per_line })))
}

pub async fn summarize_detections(State(state): State<AppState>, Json(body): Json<DetectionsBody>) -> AppResult<impl IntoResponse> {
    let (pool, line_ids, cleaned) = resolve(&state, &body.params).await?;
    let summary = detection_service::get_detection_summary(&pool, &line_ids, &cleaned, &state.cache).await?;
    Ok(Json(json!({ "total": summary.total, "by_area_type": summary.by_area_type })))
}

/// A thin format-negotiation stub: returns the same rows `query_detections`
/// would, regardless of `format` — actual CSV/XLSX encoding is out of scope.
pub async fn export_detections(
    State(state): State<AppState>,
    Query(q): Query<ExportQuery>,
    Json(body): Json<DetectionsBody>,
) -> AppResult<impl IntoResponse> {
    let (pool, line_ids, cleaned) = resolve(&state, &body.params).await?;
    let detections = detection_service::get_enriched_detections(&pool, &line_ids, &cleaned, true, &state.cache).await?;
    Ok(Json(json!({
        "format": q.format.unwrap_or_else(|| "csv".to_string()),
        "lines_queried": line_ids,
        "detections": detections,
    })))
}

async fn resolve(
    state: &AppState,
    params: &HashMap<String, Value>,
) -> AppResult<(sqlx::MySqlPool, Vec<i64>, HashMap<&'static str, crate::filters::ResolvedFilter>)> {
    let db_name = require_db(state)?;
    let pool = state.db.tenant_pool(&db_name).await?;
    let cleaned = FilterEngine::new(&state.cache).resolve_all(params)?;
    let line_ids = line_resolver::resolve(&cleaned, &state.cache)?;
    Ok((pool, line_ids, cleaned))
}

fn require_db(state: &AppState) -> AppResult<String> {
    state
        .cache
        .loaded_db_name()
        .ok_or_else(|| crate::error::AppError::SourceUnavailable("metadata cache not loaded for any tenant".to_string()))
}
