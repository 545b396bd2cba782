use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// User-facing message for upstream-timeout-class failures. Deliberately vague
/// (no provider detail) but actionable: the request is safe to retry.
pub const RETRY_HINT: &str =
    "We experienced a delay generating your reports. Please try again with shorter responses.";

/// User-facing message for any other upstream failure.
pub const UPSTREAM_HINT: &str = "Failed to generate reports. Please try again shortly.";

const VALIDATION_MESSAGE: &str = "Validation failed";
const INTERNAL_MESSAGE: &str = "An internal server error occurred. Please try again shortly.";
const RENDER_MESSAGE: &str = "Failed to produce the report document. Please try again shortly.";

/// A single field-level validation failure, surfaced verbatim to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only validation issues carry full detail to the caller; every other class
/// collapses to a generic message while the diagnostic detail goes to the logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(Vec<ValidationIssue>),

    #[error("upstream model call timed out")]
    UpstreamTimeout,

    #[error("upstream model call failed: {0}")]
    Upstream(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(issues) => {
                let body = Json(json!({
                    "error": VALIDATION_MESSAGE,
                    "issues": issues,
                }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::UpstreamTimeout => {
                tracing::error!("upstream model call timed out");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": RETRY_HINT })),
                )
                    .into_response()
            }
            AppError::Upstream(detail) => {
                tracing::error!("upstream model call failed: {detail}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": UPSTREAM_HINT })),
                )
                    .into_response()
            }
            AppError::Render(detail) => {
                tracing::error!("PDF rendering failed: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": RENDER_MESSAGE })),
                )
                    .into_response()
            }
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": INTERNAL_MESSAGE })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Validation(vec![ValidationIssue::new("ques1", "too short")]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_timeout_maps_to_503_not_500() {
        let err = AppError::UpstreamTimeout;
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_timeout_message_carries_retry_hint() {
        assert!(RETRY_HINT.to_lowercase().contains("try again"));
    }

    #[test]
    fn test_upstream_maps_to_503() {
        let err = AppError::Upstream("connection refused".to_string());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let err = AppError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
