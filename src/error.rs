//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
///
/// A cache miss is never an error; it surfaces as `None`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid input (empty key, bad TTL band, malformed request body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Named cache domain does not exist
    #[error("Unknown cache domain: {0}")]
    UnknownDomain(String),

    /// Value could not be converted to or from JSON
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Encoded payload could not be produced or decoded
    #[error("Compression failed: {0}")]
    Compression(String),

    /// Caller-supplied fetcher failed on a synchronous path
    #[error("Fetch failed: {0}")]
    Fetch(#[from] anyhow::Error),

    /// Upstream HTTP backend returned an error or was unreachable
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::UnknownDomain(_) => StatusCode::NOT_FOUND,
            CacheError::Fetch(_) | CacheError::Upstream(_) => StatusCode::BAD_GATEWAY,
            CacheError::Serialization(_)
            | CacheError::Compression(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
