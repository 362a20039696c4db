use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::layout::LayoutError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            // Payload errors go back verbatim so the operator can fix the barcode text.
            AppError::Layout(e @ LayoutError::InvalidPayload { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_PAYLOAD",
                e.to_string(),
            ),
            AppError::Layout(e @ LayoutError::MeasurementUnavailable(_)) => {
                tracing::error!("Text measurement unavailable: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MEASUREMENT_UNAVAILABLE",
                    e.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
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
