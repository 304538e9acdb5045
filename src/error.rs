//! Error types for the proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Proxy Error Enum ==
/// Unified error type for the proxy.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Key absent in both cache and backing store
    #[error("key not found: {0}")]
    NotFound(String),

    /// Backing store failure other than not-found
    #[error("backend error: {0}")]
    Backend(String),

    /// Malformed request frame; fatal to the connection
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Stream transport failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProxyError::NotFound(key) => (StatusCode::NOT_FOUND, format!("key not found: {}", key)),
            ProxyError::Backend(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ProxyError::Protocol(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ProxyError::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the proxy.
pub type Result<T> = std::result::Result<T, ProxyError>;
