//! API Module
//!
//! HTTP surface of the offline proxy.
//!
//! # Endpoints
//! - `GET /__worker/health` - Health check endpoint
//! - `GET /__worker/status` - Worker state and cache stores
//! - `POST /__worker/message` - Client control message (`SKIP_WAITING`)
//! - fallback - every other request, intercepted by the worker

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
