//! Query Layer
//!
//! What the view layer's data hooks call: every read is counted by the
//! access tracker and then served through the request cache.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{ApiRequest, DataCache, RequestCache, RequestOptions};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tracker::{AccessTracker, FileUsageStore, UsageStore};

// == Query Client ==
/// Data cache plus access tracker, both injected by the caller.
pub struct QueryClient<T, S> {
    cache: RequestCache<T>,
    tracker: Arc<AccessTracker<S>>,
}

impl<T, S> Clone for QueryClient<T, S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            tracker: Arc::clone(&self.tracker),
        }
    }
}

impl<T, S> QueryClient<T, S>
where
    T: Clone + Send + Sync,
    S: UsageStore,
{
    pub fn new(cache: RequestCache<T>, tracker: Arc<AccessTracker<S>>) -> Self {
        Self { cache, tracker }
    }

    pub fn cache(&self) -> &RequestCache<T> {
        &self.cache
    }

    pub fn tracker(&self) -> &AccessTracker<S> {
        &self.tracker
    }

    // == Query ==
    /// Records the access, then returns the cached value or fetches it.
    pub async fn query<F, Fut>(
        &self,
        request: &ApiRequest,
        options: RequestOptions,
        fetcher: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = request.cache_key();
        self.tracker.record_access(&key).await?;
        self.cache.fetch_key(&key, options, fetcher).await
    }

    // == Prefetch ==
    /// Warms the cache for `request` if it is not already cached.
    ///
    /// Called once when a detail view has loaded its primary record. Fetch
    /// failures are logged and dropped; the caller has nothing waiting on
    /// this value. Returns whether a fetch was performed and succeeded.
    pub async fn prefetch<F, Fut>(&self, request: &ApiRequest, fetcher: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = request.cache_key();
        if self.cache.get(&key).await.is_some() {
            debug!(key, "prefetch skipped, already cached");
            return false;
        }

        match fetcher().await {
            Ok(data) => {
                self.cache.set(key.clone(), data, None).await;
                debug!(key, "prefetched");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "prefetch failed");
                false
            }
        }
    }

    /// Drops the cached value for `request`, e.g. after a mutation.
    pub async fn invalidate(&self, request: &ApiRequest) -> bool {
        self.cache.delete(&request.cache_key()).await
    }
}

impl<T> QueryClient<T, FileUsageStore>
where
    T: Clone + Send + Sync,
{
    /// Client sized from configuration, tracking accesses in
    /// `usage_stats_path`.
    pub fn from_config(config: &Config) -> Self {
        let cache = RequestCache::new(DataCache::new(config.max_entries, config.default_ttl_ms));
        let tracker = AccessTracker::new(FileUsageStore::new(&config.usage_stats_path));
        Self::new(cache, Arc::new(tracker))
    }
}

impl<T, S> std::fmt::Debug for QueryClient<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient").finish_non_exhaustive()
    }
}

/// Shortcut for fetchers that cannot fail.
pub fn ready<T>(data: T) -> std::future::Ready<std::result::Result<T, CacheError>> {
    std::future::ready(Ok(data))
}
