//! Cache Policy Module
//!
//! Decides whether a fetched response may be stored, and whether a stored
//! API response is still fresh.

use axum::http::header;

use crate::worker::{ResponseType, StoredResponse};

// == Cache Decision ==
/// Outcome of checking a response against the storage rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    Store,
    /// Returned to the caller but never persisted
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSuccess,
    NotBasic,
    NoStore,
}

/// A response is storable when it is 2xx, `basic`, and its `Cache-Control`
/// carries neither `no-store` nor `no-cache`.
pub fn cache_decision(response: &StoredResponse) -> CacheDecision {
    if !response.status.is_success() {
        return CacheDecision::Skip(SkipReason::NotSuccess);
    }
    if response.response_type != ResponseType::Basic {
        return CacheDecision::Skip(SkipReason::NotBasic);
    }
    let forbids_storage = response
        .header(header::CACHE_CONTROL.as_str())
        .map(|cc| {
            let cc = cc.to_ascii_lowercase();
            cc.contains("no-store") || cc.contains("no-cache")
        })
        .unwrap_or(false);
    if forbids_storage {
        return CacheDecision::Skip(SkipReason::NoStore);
    }
    CacheDecision::Store
}

pub fn is_cacheable(response: &StoredResponse) -> bool {
    cache_decision(response) == CacheDecision::Store
}

// == Freshness ==
/// Age of a stored response at `now_ms`, measured from its `Date` header.
pub fn response_age_ms(response: &StoredResponse, now_ms: u64) -> u64 {
    now_ms.saturating_sub(response.date_ms())
}

/// Fresh while the age is strictly below `window_ms`.
pub fn is_fresh(response: &StoredResponse, now_ms: u64, window_ms: u64) -> bool {
    response_age_ms(response, now_ms) < window_ms
}
