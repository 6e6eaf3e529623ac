//! API Routes
//!
//! Configures the Axum router: a small control surface under `/__worker`
//! and an intercepting fallback for everything else.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health_handler, intercept_handler, message_handler, status_handler, AppState};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /__worker/health` - Health check endpoint
/// - `GET /__worker/status` - Worker state and cache stores
/// - `POST /__worker/message` - Client control message
/// - anything else - intercepted and answered by the worker
///
/// # Middleware
/// - CORS: Allows any origin on the control surface
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let control = Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/message", post(message_handler))
        .layer(cors);

    Router::new()
        .nest("/__worker", control)
        .fallback(intercept_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::testing::FakeNetwork;
    use crate::worker::{CacheStorage, ServiceWorker, StoredResponse, WorkerSettings};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app(network: std::sync::Arc<FakeNetwork>) -> Router {
        let settings = WorkerSettings {
            app_name: "claims".to_string(),
            version: "1.0.0".to_string(),
            origin: "http://app.local".to_string(),
            precache_assets: vec!["/".to_string()],
        };
        let worker = ServiceWorker::new(settings, CacheStorage::new(), network);
        create_router(AppState::new(worker))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app(FakeNetwork::new());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/__worker/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_message_endpoint_rejects_unknown_type() {
        let app = create_test_app(FakeNetwork::new());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/__worker/message")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"type":"RELOAD"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_fallback_forwards_while_installing() {
        let network = FakeNetwork::new();
        network.respond("http://app.local/main.js", StoredResponse::ok("js"));
        let app = create_test_app(network.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/main.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_offline_maps_to_bad_gateway() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let app = create_test_app(network);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/claims")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
