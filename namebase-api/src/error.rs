//! Error types for the HTTP layer
//!
//! Every handler returns [`ApiResult`]; the variant decides the status code
//! and the machine-readable `code` in the JSON error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::reconciler::ReconcileError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid query parameter (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Unknown country or empty result set (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Client exceeded its request quota (429)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// Name predictor call failed (500)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// namebase-common error
    #[error("Common error: {0}")]
    Common(#[from] namebase_common::Error),
}

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        match err {
            e @ ReconcileError::Prediction { .. } => ApiError::Upstream(e.to_string()),
            ReconcileError::Store(e) => ApiError::Common(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::TooManyRequests(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg)
            }
            ApiError::Upstream(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                msg,
            ),
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
