use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resources::ApiError;
use crate::validation::FieldErrors;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("No drag in progress")]
    DragNotActive,

    #[error("Upstream error: {0}")]
    Upstream(#[from] ApiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(fields) => {
                let body = Json(json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": fields.to_string(),
                        "fields": fields,
                    }
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::UnknownStage(stage_id) => (
                StatusCode::BAD_REQUEST,
                "UNKNOWN_STAGE",
                format!("Stage '{stage_id}' is not part of this pipeline"),
            ),
            AppError::DragNotActive => (
                StatusCode::CONFLICT,
                "DRAG_NOT_ACTIVE",
                "No item is being dragged in this session".to_string(),
            ),
            AppError::Upstream(e) => {
                tracing::warn!("Upstream error: {e}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
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
