//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the data cache, the tracker and the worker.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network fetch failed and no cached fallback was usable
    #[error("Network error: {0}")]
    Network(String),

    /// Precaching a static asset failed during install
    #[error("Install failed: {0}")]
    Install(String),

    /// Persisted state could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Persistent storage could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Network(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::Network(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            CacheError::Install(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CacheError::Serialization(msg)
            | CacheError::Storage(msg)
            | CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(ErrorResponse::new(message));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_maps_to_bad_gateway() {
        let response = CacheError::Network("offline".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_install_error_maps_to_503() {
        let response = CacheError::Install("/logo192.png".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_serde_error_converts_to_serialization() {
        let err: CacheError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, CacheError::Serialization(_)));
    }
}
