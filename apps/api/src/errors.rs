use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resolution::ResolutionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    /// Loaded catalog/index state is inconsistent; requests cannot be served.
    #[error("Index corrupt: {0}")]
    IndexCorrupt(String),
}

impl From<ResolutionError> for AppError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::ModelUnavailable(msg) => AppError::ModelUnavailable(msg),
            e @ ResolutionError::IndexCorrupt { .. } => AppError::IndexCorrupt(e.to_string()),
            e @ ResolutionError::InvalidEmbedding(_) => AppError::ModelUnavailable(e.to_string()),
        }
    }
}

/// Malformed or incomplete JSON bodies become 400s with the standard error body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMBEDDING_UNAVAILABLE",
                    "The role matching model is currently unavailable".to_string(),
                )
            }
            AppError::IndexCorrupt(msg) => {
                tracing::error!("Index corrupt: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "INDEX_CORRUPT",
                    "Role index is inconsistent; reload required".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
