//! Response DTOs
//!
//! Defines the structure of outgoing control-surface response bodies.

use serde::Serialize;

use crate::worker::WorkerState;

/// Response body for the health endpoint (GET /__worker/health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for POST /__worker/message
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Worker state after the message was applied
    pub state: WorkerState,
    pub skip_waiting: bool,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_message_response_serialize() {
        let resp = MessageResponse {
            state: WorkerState::Active,
            skip_waiting: true,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"state":"active","skip_waiting":true}"#);
    }

    #[test]
    fn test_error_response_serialize() {
        let json = serde_json::to_string(&ErrorResponse::new("offline")).unwrap();
        assert_eq!(json, r#"{"error":"offline"}"#);
    }
}
