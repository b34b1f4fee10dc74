//! `/dashboard/data` and `/dashboard/preview` — the main pipeline entry
//! points, backed by `DashboardOrchestrator`.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::orchestrator::DashboardOrchestrator;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardBody {
    pub widget_ids: Option<Vec<i64>>,
    pub tenant_id: Option<i64>,
    pub role: Option<String>,
    #[serde(flatten)]
    pub params: HashMap<String, Value>,
}

pub async fn dashboard_data(State(state): State<AppState>, Json(body): Json<DashboardBody>) -> AppResult<impl IntoResponse> {
    run(state, body, false).await
}

pub async fn dashboard_data_query(State(state): State<AppState>, Query(raw): Query<HashMap<String, String>>) -> AppResult<impl IntoResponse> {
    let body = body_from_query(raw);
    run(state, body, false).await
}

pub async fn dashboard_preview(State(state): State<AppState>, Json(body): Json<DashboardBody>) -> AppResult<impl IntoResponse> {
    if body.widget_ids.as_ref().map(|v| v.is_empty()).unwrap_or(true) {
        return Err(AppError::Validation("widget_ids is required for /dashboard/preview".to_string()));
    }
    run(state, body, true).await
}

async fn run(state: AppState, body: DashboardBody, _is_preview: bool) -> AppResult<impl IntoResponse> {
    let db_name = state
        .cache
        .loaded_db_name()
        .ok_or_else(|| AppError::SourceUnavailable("metadata cache not loaded for any tenant".to_string()))?;
    let tenant_pool = state.db.tenant_pool(&db_name).await?;
    let global_pool = state.db.global_pool();

    let tenant_id = body.tenant_id.unwrap_or(1);
    let role = body.role.unwrap_or_else(|| "ADMIN".to_string());

    let result = DashboardOrchestrator::execute(
        &tenant_pool,
        global_pool,
        &state.cache,
        &body.params,
        tenant_id,
        &role,
        body.widget_ids.as_deref(),
        state.config.widgets.active_threshold_minutes,
    )
    .await?;

    Ok(Json(result))
}

/// Reconstructs a `DashboardBody`-equivalent params map from a flat
/// query string, assembling `daterange` out of its four constituent
/// keys the way the frontend's GET requests shape them.
fn body_from_query(mut raw: HashMap<String, String>) -> DashboardBody {
    let tenant_id = raw.remove("tenant_id").and_then(|v| v.parse().ok());
    let role = raw.remove("role");
    let widget_ids = raw
        .remove("widget_ids")
        .map(|v| v.split(',').filter_map(|p| p.trim().parse::<i64>().ok()).collect());

    let start_date = raw.remove("start_date");
    let end_date = raw.remove("end_date");
    let start_time = raw.remove("start_time");
    let end_time = raw.remove("end_time");

    let mut params: HashMap<String, Value> = HashMap::new();

    if let (Some(sd), Some(ed)) = (start_date, end_date) {
        params.insert(
            "daterange".to_string(),
            serde_json::json!({
                "start_date": sd,
                "end_date": ed,
                "start_time": start_time,
                "end_time": end_time,
            }),
        );
    }

    for (k, v) in raw {
        let value = if let Ok(n) = v.parse::<i64>() {
            Value::from(n)
        } else if let Ok(b) = v.parse::<bool>() {
            Value::Bool(b)
        } else {
            Value::String(v)
        };
        params.insert(k, value);
    }

    DashboardBody { widget_ids, tenant_id, role, params }
}
