//! Fetch Strategies Module
//!
//! The three ways an intercepted GET can be answered: cache-first for static
//! assets, network-first for navigations, stale-while-revalidate for API
//! calls.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::error::Result;
use crate::tasks::spawn_revalidation;
use crate::worker::{cache_decision, is_fresh, CacheDecision, FetchRequest, NamedCache, SharedNetwork, StoredResponse};

// == Strategy Context ==
/// What a strategy needs: the current version's store, the network, a
/// clock and the fallbacks.
#[derive(Debug, Clone)]
pub struct StrategyContext {
    pub store: Arc<NamedCache>,
    pub network: SharedNetwork,
    pub clock: SharedClock,
    /// Store key of the root document served to offline navigations
    pub root_document_key: String,
    /// Age under which an API response is served without waiting on the network
    pub freshness_ms: u64,
}

impl StrategyContext {
    /// Stores `response` when it passes the cacheability rules.
    async fn fill(&self, request: &FetchRequest, response: &StoredResponse) {
        match cache_decision(response) {
            CacheDecision::Store => self.store.put(request, response.clone()).await,
            CacheDecision::Skip(reason) => {
                debug!(url = %request.cache_key(), ?reason, "response not stored");
            }
        }
    }
}

// == Cache First ==
/// Serves from the store; on a miss fetches, fills the store when allowed,
/// and returns the network response.
pub async fn cache_first(ctx: &StrategyContext, request: &FetchRequest) -> Result<StoredResponse> {
    if let Some(hit) = ctx.store.match_request(request).await {
        debug!(url = %request.cache_key(), "cache-first hit");
        return Ok(hit);
    }

    let response = ctx.network.fetch(request).await?;
    ctx.fill(request, &response).await;
    Ok(response)
}

// == Network First ==
/// Tries the network; when it fails, answers with the stored root document.
/// Only when that is missing too does the network error reach the caller.
pub async fn network_first(
    ctx: &StrategyContext,
    request: &FetchRequest,
) -> Result<StoredResponse> {
    match ctx.network.fetch(request).await {
        Ok(response) => Ok(response),
        Err(e) => match ctx.store.match_key(&ctx.root_document_key).await {
            Some(shell) => {
                warn!(url = %request.cache_key(), error = %e, "navigation offline, serving cached root document");
                Ok(shell)
            }
            None => Err(e),
        },
    }
}

// == Stale While Revalidate ==
/// Serves a fresh stored response immediately and refreshes it in the
/// background. Stale or missing entries are fetched synchronously. If that
/// fetch fails the store is checked once more, and the error surfaces only
/// when it still has nothing.
pub async fn stale_while_revalidate(
    ctx: &StrategyContext,
    request: &FetchRequest,
) -> Result<StoredResponse> {
    let now = ctx.clock.now_ms();

    if let Some(cached) = ctx.store.match_request(request).await {
        if is_fresh(&cached, now, ctx.freshness_ms) {
            debug!(url = %request.cache_key(), "serving fresh API response, revalidating");
            // Detached: dropping the handle leaves the task running.
            drop(spawn_revalidation(
                Arc::clone(&ctx.store),
                Arc::clone(&ctx.network),
                request.clone(),
            ));
            return Ok(cached);
        }
        debug!(url = %request.cache_key(), "stored API response is stale");
    }

    match ctx.network.fetch(request).await {
        Ok(response) => {
            ctx.fill(request, &response).await;
            Ok(response)
        }
        Err(e) => match ctx.store.match_request(request).await {
            Some(fallback) => {
                warn!(url = %request.cache_key(), error = %e, "API offline, serving stored response");
                Ok(fallback)
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::API_FRESHNESS_MS;
    use crate::error::CacheError;
    use crate::worker::testing::{eventually, FakeNetwork};
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000_000;
    const MINUTE: u64 = 60_000;
    const ORIGIN: &str = "http://app.local";

    fn context(network: Arc<FakeNetwork>) -> StrategyContext {
        StrategyContext {
            store: Arc::new(NamedCache::new("claims-cache-1.0.0")),
            network,
            clock: Arc::new(ManualClock::new(NOW)),
            root_document_key: format!("{ORIGIN}/"),
            freshness_ms: API_FRESHNESS_MS,
        }
    }

    fn get(path: &str) -> FetchRequest {
        FetchRequest::get(&format!("{ORIGIN}{path}")).unwrap()
    }

    // == cache-first ==

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let network = FakeNetwork::new();
        let ctx = context(network.clone());
        ctx.store.put(&get("/logo192.png"), StoredResponse::ok("cached")).await;

        let resp = cache_first(&ctx, &get("/logo192.png")).await.unwrap();
        assert_eq!(resp.body, "cached");
        assert_eq!(network.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_miss_fetches_and_fills() {
        let network = FakeNetwork::new();
        network.respond(&format!("{ORIGIN}/main.js"), StoredResponse::ok("js"));
        let ctx = context(network.clone());

        let resp = cache_first(&ctx, &get("/main.js")).await.unwrap();
        assert_eq!(resp.body, "js");
        assert!(ctx.store.match_request(&get("/main.js")).await.is_some());

        cache_first(&ctx, &get("/main.js")).await.unwrap();
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_fill_no_store() {
        let network = FakeNetwork::new();
        network.respond(
            &format!("{ORIGIN}/config.js"),
            StoredResponse::ok("cfg").with_header("cache-control", "no-store"),
        );
        let ctx = context(network.clone());

        let resp = cache_first(&ctx, &get("/config.js")).await.unwrap();
        assert_eq!(resp.body, "cfg");
        assert!(ctx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_fill_errors() {
        let network = FakeNetwork::new();
        let ctx = context(network.clone());

        let resp = cache_first(&ctx, &get("/missing.css")).await.unwrap();
        assert_eq!(resp.status, axum::http::StatusCode::NOT_FOUND);
        assert!(ctx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_first_offline_miss_propagates() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network);

        let result = cache_first(&ctx, &get("/main.js")).await;
        assert!(matches!(result, Err(CacheError::Network(_))));
    }

    // == network-first ==

    #[tokio::test]
    async fn test_navigation_online_uses_network() {
        let network = FakeNetwork::new();
        network.respond(&format!("{ORIGIN}/claims/7"), StoredResponse::ok("live page"));
        let ctx = context(network);
        ctx.store.put(&get("/"), StoredResponse::ok("shell")).await;

        let resp = network_first(&ctx, &get("/claims/7")).await.unwrap();
        assert_eq!(resp.body, "live page");
    }

    #[tokio::test]
    async fn test_navigation_offline_serves_root_document() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network);
        ctx.store.put(&get("/"), StoredResponse::ok("shell")).await;

        let resp = network_first(&ctx, &get("/claims/7")).await.unwrap();
        assert_eq!(resp.body, "shell");
    }

    #[tokio::test]
    async fn test_navigation_offline_without_shell_propagates() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network);

        assert!(network_first(&ctx, &get("/claims/7")).await.is_err());
    }

    // == stale-while-revalidate ==

    #[tokio::test]
    async fn test_swr_fresh_returns_cached_without_waiting_on_network() {
        let network = FakeNetwork::new();
        network.hold();
        network.respond(
            &format!("{ORIGIN}/api/claims"),
            StoredResponse::ok("new").dated(NOW),
        );
        let ctx = context(network.clone());
        ctx.store
            .put(&get("/api/claims"), StoredResponse::ok("old").dated(NOW - 4 * MINUTE))
            .await;

        let resp = tokio::time::timeout(
            Duration::from_millis(500),
            stale_while_revalidate(&ctx, &get("/api/claims")),
        )
        .await
        .expect("fresh response must not wait for the network")
        .unwrap();
        assert_eq!(resp.body, "old");

        // the background refresh was issued and, once released, lands in the store
        network.wait_for_calls(1).await;
        network.release_one();
        let store = ctx.store.clone();
        eventually(|| {
            let store = store.clone();
            async move {
                store
                    .match_request(&get("/api/claims"))
                    .await
                    .map(|r| r.body == "new")
                    .unwrap_or(false)
            }
        })
        .await;
    }

    #[tokio::test]
    async fn test_swr_stale_fetches_synchronously() {
        let network = FakeNetwork::new();
        network.respond(
            &format!("{ORIGIN}/api/claims"),
            StoredResponse::ok("new").dated(NOW),
        );
        let ctx = context(network.clone());
        ctx.store
            .put(&get("/api/claims"), StoredResponse::ok("old").dated(NOW - 6 * MINUTE))
            .await;

        let resp = stale_while_revalidate(&ctx, &get("/api/claims")).await.unwrap();
        assert_eq!(resp.body, "new");
        assert_eq!(network.calls(), 1);
        assert_eq!(
            ctx.store.match_request(&get("/api/claims")).await.unwrap().body,
            "new"
        );
    }

    #[tokio::test]
    async fn test_swr_background_failure_is_invisible() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network.clone());
        ctx.store
            .put(&get("/api/projects"), StoredResponse::ok("old").dated(NOW - MINUTE))
            .await;

        let resp = stale_while_revalidate(&ctx, &get("/api/projects")).await.unwrap();
        assert_eq!(resp.body, "old");

        network.wait_for_calls(1).await;
        assert_eq!(
            ctx.store.match_request(&get("/api/projects")).await.unwrap().body,
            "old"
        );
    }

    #[tokio::test]
    async fn test_swr_offline_with_stale_entry_falls_back() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network);
        ctx.store
            .put(&get("/api/claims"), StoredResponse::ok("stale").dated(NOW - 60 * MINUTE))
            .await;

        let resp = stale_while_revalidate(&ctx, &get("/api/claims")).await.unwrap();
        assert_eq!(resp.body, "stale");
    }

    #[tokio::test]
    async fn test_swr_offline_without_entry_propagates() {
        let network = FakeNetwork::new();
        network.set_offline(true);
        let ctx = context(network);

        let result = stale_while_revalidate(&ctx, &get("/api/claims")).await;
        assert!(matches!(result, Err(CacheError::Network(_))));
    }

    #[tokio::test]
    async fn test_swr_never_stores_uncacheable() {
        let network = FakeNetwork::new();
        network.respond(
            &format!("{ORIGIN}/api/session"),
            StoredResponse::ok("secret").with_header("cache-control", "no-store"),
        );
        let ctx = context(network);

        let resp = stale_while_revalidate(&ctx, &get("/api/session")).await.unwrap();
        assert_eq!(resp.body, "secret");
        assert!(ctx.store.match_request(&get("/api/session")).await.is_none());
    }

    #[tokio::test]
    async fn test_swr_undated_entry_is_stale() {
        let network = FakeNetwork::new();
        network.respond(&format!("{ORIGIN}/api/x"), StoredResponse::ok("new"));
        let ctx = context(network.clone());
        ctx.store.put(&get("/api/x"), StoredResponse::ok("undated")).await;

        let resp = stale_while_revalidate(&ctx, &get("/api/x")).await.unwrap();
        assert_eq!(resp.body, "new");
    }
}
