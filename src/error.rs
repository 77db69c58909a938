//! Error types for the gate
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Gate Error Enum ==
/// Unified error type for the gate and its admin API.
///
/// Cache misses are never errors (they are `None`), and the core never
/// surfaces throttling as an error either. `Throttled` only comes out of the
/// fail-fast admission endpoint.
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Identity has no remaining capacity in its window
    #[error("Rate limit exceeded for '{identity}', retry in {retry_after_ms}ms")]
    Throttled {
        identity: String,
        retry_after_ms: u64,
    },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = match &self {
            GateError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GateError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GateError::NotFound(_) => StatusCode::NOT_FOUND,
            GateError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            GateError::Throttled {
                identity,
                retry_after_ms,
            } => Json(json!({
                "error": self.to_string(),
                "identity": identity,
                "retry_after_ms": retry_after_ms,
            })),
            _ => Json(json!({
                "error": self.to_string()
            })),
        };

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the gate.
pub type Result<T> = std::result::Result<T, GateError>;
