//! `GET /filters` and `GET /filters/{class_name}/options`.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::filters::FilterEngine;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FiltersQuery {
    pub filter_ids: Option<String>,
}

pub async fn list_filters(State(state): State<AppState>, Query(q): Query<FiltersQuery>) -> AppResult<impl IntoResponse> {
    let engine = FilterEngine::new(&state.cache);
    let wanted: Option<Vec<i64>> = q
        .filter_ids
        .map(|s| s.split(',').filter_map(|p| p.trim().parse::<i64>().ok()).collect());

    let mut out = Vec::new();
    for (row, descriptor) in engine.get_all()? {
        if let Some(ids) = &wanted {
            if !ids.contains(&row.filter_id) {
                continue;
            }
        }
        let options = match descriptor.options_source {
            Some(source) => crate::filters::types::load_options(source, &state.cache, row.filter_id)?,
            None => Vec::new(),
        };
        out.push(json!({
            "filter_id": row.filter_id,
            "filter_name": row.filter_name,
            "description": row.description,
            "param_name": descriptor.param_name,
            "required": descriptor.required,
            "depends_on": descriptor.depends_on,
            "default_value": descriptor.default_value,
            "ui_config": descriptor.ui_config,
            "options": options,
        }));
    }

    Ok(Json(json!({ "filters": out })))
}

#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub line_id: Option<String>,
}

pub async fn filter_options(
    State(state): State<AppState>,
    Path(class_name): Path<String>,
    Query(_q): Query<OptionsQuery>,
) -> AppResult<impl IntoResponse> {
    let engine = FilterEngine::new(&state.cache);
    let options = engine.resolve_options(&class_name)?;

    if crate::registry::filters::lookup(&class_name).is_none() {
        return Err(AppError::Resolution(format!("unknown filter class '{class_name}'")));
    }

    Ok(Json(json!({ "options": options })))
}
