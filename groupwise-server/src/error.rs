//! Error types for groupwise-server
//!
//! Every failure reaches the client as
//! `{"error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Engine error; status depends on whether the caller is at fault
    #[error(transparent)]
    Common(#[from] groupwise_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
            ApiError::Common(ref err) if err.is_client_error() => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", err.to_string())
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_code, message);
        }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let invalid = ApiError::from(groupwise_common::Error::InvalidInput("x".into()));
        assert_eq!(invalid.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = ApiError::from(groupwise_common::Error::Internal("x".into()));
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let bad = ApiError::BadRequest("x".into());
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
