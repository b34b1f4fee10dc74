//! `GET /layout/config?tenant_id&role`.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::layout::LayoutService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub tenant_id: i64,
    pub role: String,
}

pub async fn get_layout_config(State(state): State<AppState>, Query(q): Query<LayoutQuery>) -> AppResult<impl IntoResponse> {
    let layout = LayoutService::get_layout_config(state.db.global_pool(), q.tenant_id, &q.role)
        .await?
        .ok_or_else(|| AppError::Resolution(format!("no layout for tenant_id={}, role={}", q.tenant_id, q.role)))?;

    let widgets = LayoutService::resolve_widgets(&state.cache, &layout.enabled_widget_ids)?;

    Ok(Json(json!({
        "tenant_id": layout.tenant_id,
        "role": layout.role,
        "enabled_widget_ids": layout.enabled_widget_ids,
        "enabled_filter_ids": layout.enabled_filter_ids,
        "widgets": widgets,
    })))
}
