//! Claims Cache - offline caching layer for the claims tracker
//!
//! Two independent caches plus a usage side channel:
//! - a network interception cache that answers requests from versioned
//!   stores using cache-first, network-first and stale-while-revalidate;
//! - an in-process data cache with TTL expiry and LRU eviction;
//! - an access-frequency tracker fed by every read through the query layer.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod tasks;
pub mod tracker;
pub mod worker;

pub use api::{create_router, AppState};
pub use cache::{ApiRequest, DataCache, RequestCache, RequestOptions};
pub use config::Config;
pub use error::{CacheError, Result};
pub use query::QueryClient;
pub use tasks::{spawn_install_task, spawn_revalidation};
pub use tracker::AccessTracker;
pub use worker::{FetchOutcome, FetchRequest, ServiceWorker, StoredResponse, WorkerState};
