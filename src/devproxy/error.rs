//! Proxy Error Types
//!
//! Errors raised while forwarding a request, and their conversion to HTTP
//! responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Development proxy errors
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Path is outside the forwarded prefix
    #[error("No proxy rule for path: {0}")]
    NoRoute(String),

    /// Target origin in the configuration is not a usable URL
    #[error("Invalid proxy target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Incoming request body could not be read
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// Backend could not be reached or its response could not be read
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// HTTP client construction failed
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error (binding the listener)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ProxyError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ProxyError::NoRoute(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ProxyError::Body(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ProxyError::Upstream(_) => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            ProxyError::InvalidTarget { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_TARGET")
            }
            ProxyError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ProxyError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Proxy error"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request not proxied"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;
