//! API Handlers
//!
//! HTTP handlers for the worker control endpoints and the intercepting
//! fallback that every other request goes through.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{ControlMessage, HealthResponse, MessageResponse};
use crate::worker::{
    resolve, CacheStorage, FetchOutcome, FetchRequest, HttpNetwork, RequestMode, ServiceWorker,
    WorkerSettings, WorkerStatus,
};

/// Largest request body forwarded upstream
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The worker answering intercepted requests
    pub worker: Arc<ServiceWorker>,
}

impl AppState {
    pub fn new(worker: ServiceWorker) -> Self {
        Self {
            worker: Arc::new(worker),
        }
    }

    /// Creates the worker from configuration, talking to the configured
    /// upstream over HTTP.
    pub fn from_config(config: &Config) -> Self {
        let network = Arc::new(HttpNetwork::new(config.upstream_origin.clone()));
        let worker = ServiceWorker::new(
            WorkerSettings::from_config(config),
            CacheStorage::new(),
            network,
        );
        Self::new(worker)
    }
}

/// Handler for GET /__worker/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /__worker/status
pub async fn status_handler(State(state): State<AppState>) -> Json<WorkerStatus> {
    Json(state.worker.status().await)
}

/// Handler for POST /__worker/message
///
/// `{"type": "SKIP_WAITING"}` activates a waiting worker immediately.
pub async fn message_handler(
    State(state): State<AppState>,
    Json(message): Json<ControlMessage>,
) -> Result<Json<MessageResponse>> {
    let worker_state = state.worker.handle_message(message).await?;

    Ok(Json(MessageResponse {
        state: worker_state,
        skip_waiting: state.worker.skip_waiting_requested(),
    }))
}

/// Fallback handler: every request not aimed at the control surface.
///
/// Relative request targets are resolved against the application origin.
/// Absolute-form targets naming any other origin are rejected: the proxy
/// only ever forwards to its own upstream.
pub async fn intercept_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| CacheError::InvalidRequest(format!("unreadable body: {e}")))?;

    let url = if parts.uri.scheme().is_some() {
        parts.uri.to_string()
    } else {
        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        resolve(&state.worker.settings().origin, path)
    };

    let mode = RequestMode::from_headers(&parts.method, &parts.headers);
    let fetch = FetchRequest::new(parts.method, &url, mode)?
        .with_headers(parts.headers)
        .with_body(body);

    if !state.worker.is_same_origin(&fetch) {
        return Err(CacheError::InvalidRequest(format!(
            "refusing to proxy foreign origin {}",
            fetch.origin()
        )));
    }

    match state.worker.handle_fetch(&fetch).await? {
        FetchOutcome::Respond(response) => Ok(response.into_response()),
        FetchOutcome::Passthrough => {
            debug!(method = %fetch.method, url = %fetch.url(), "passthrough");
            let response = state.worker.network().fetch(&fetch).await?;
            Ok(response.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::FakeNetwork;
    use crate::worker::{StoredResponse, WorkerState};
    use axum::http::StatusCode;

    fn state(network: Arc<FakeNetwork>) -> AppState {
        let settings = WorkerSettings {
            app_name: "claims".to_string(),
            version: "1.0.0".to_string(),
            origin: "http://app.local".to_string(),
            precache_assets: vec!["/".to_string()],
        };
        AppState::new(ServiceWorker::new(settings, CacheStorage::new(), network))
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_message_handler_activates_waiting_worker() {
        let network = FakeNetwork::new();
        network.respond("http://app.local/", StoredResponse::ok("shell"));
        let state = state(network);
        state.worker.install().await.unwrap();

        let response = message_handler(State(state.clone()), Json(ControlMessage::SkipWaiting))
            .await
            .unwrap();

        assert_eq!(response.state, WorkerState::Active);
        assert!(response.skip_waiting);
    }

    #[tokio::test]
    async fn test_status_handler_reports_installing() {
        let state = state(FakeNetwork::new());
        let response = status_handler(State(state)).await;
        assert_eq!(response.state, WorkerState::Installing);
        assert_eq!(response.cached_entries, 0);
    }

    #[tokio::test]
    async fn test_intercept_resolves_relative_target() {
        let network = FakeNetwork::new();
        network.respond("http://app.local/api/claims", StoredResponse::ok("[]"));
        let state = state(network.clone());

        let request = axum::http::Request::builder()
            .uri("/api/claims")
            .body(Body::empty())
            .unwrap();
        let response = intercept_handler(State(state), request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_intercept_rejects_foreign_absolute_target() {
        let network = FakeNetwork::new();
        network.respond("http://internal.metadata/secret", StoredResponse::ok("secret"));
        let state = state(network.clone());

        let request = axum::http::Request::builder()
            .uri("http://internal.metadata/secret")
            .body(Body::empty())
            .unwrap();
        let result = intercept_handler(State(state), request).await;

        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_intercept_accepts_own_absolute_target() {
        let network = FakeNetwork::new();
        network.respond("http://app.local/main.js", StoredResponse::ok("js"));
        let state = state(network.clone());

        let request = axum::http::Request::builder()
            .uri("http://APP.local/main.js")
            .body(Body::empty())
            .unwrap();
        let response = intercept_handler(State(state), request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(network.calls(), 1);
    }
}
