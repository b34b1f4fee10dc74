use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// The error taxonomy every layer of the pipeline maps into.
///
/// `Processing` and `Invariant` are caught well before they would ever
/// become an `AppError` — the widget engine folds them into a per-widget
/// error result instead (see `widgets::engine`). They still have variants
/// here because a few admin-surface handlers (cache load, partition
/// management) have no "one bad widget" to shield behind and must report
/// them directly.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    Resolution(String),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            AppError::Resolution(m) => (StatusCode::NOT_FOUND, m.clone()),
            AppError::SourceUnavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
            AppError::Processing(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            AppError::Invariant(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            AppError::Database(e) => {
                tracing::error!("database error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "database error".to_string())
            }
        };

        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR | StatusCode::SERVICE_UNAVAILABLE) {
            tracing::error!("{message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
