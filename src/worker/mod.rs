//! Network Interception Module
//!
//! Versioned offline worker that sits between the page and the network:
//! precaches static assets on install, purges old versions on activate, and
//! answers intercepted GETs with cache-first, network-first or
//! stale-while-revalidate depending on the URL.

mod lifecycle;
mod network;
mod policy;
mod request;
mod response;
mod storage;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use lifecycle::{FetchOutcome, Route, ServiceWorker, WorkerSettings, WorkerState, WorkerStatus};
pub use network::{HttpNetwork, Network, SharedNetwork};
pub use policy::{cache_decision, is_cacheable, is_fresh, response_age_ms, CacheDecision, SkipReason};
pub use request::{resolve, FetchRequest, RequestMode};
pub use response::{format_http_date, parse_http_date, ResponseType, StoredResponse};
pub use storage::{CacheStorage, NamedCache};
