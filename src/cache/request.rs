//! Cached Request Module
//!
//! Wraps data-fetch functions with the data cache: hits skip the fetch,
//! misses fetch and write through.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{ApiRequest, CacheStats, DataCache};

// == Request Options ==
/// Per-call knobs for [`RequestCache::fetch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// TTL in milliseconds for the written entry; cache default when `None`
    pub ttl: Option<u64>,
    /// Skip the read path, always fetch, still write through on success
    pub force_refresh: bool,
}

impl RequestOptions {
    pub fn with_ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            force_refresh: false,
        }
    }

    pub fn refresh() -> Self {
        Self {
            ttl: None,
            force_refresh: true,
        }
    }
}

// == Request Cache ==
/// Shared handle to a [`DataCache`] used by the data-fetching layer.
///
/// The lock is held only while touching the map, never across the
/// fetcher's await point.
pub struct RequestCache<T> {
    cache: Arc<RwLock<DataCache<T>>>,
}

impl<T> Clone for RequestCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T: Clone + Send + Sync> RequestCache<T> {
    pub fn new(cache: DataCache<T>) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Returns the underlying shared cache.
    pub fn inner(&self) -> Arc<RwLock<DataCache<T>>> {
        Arc::clone(&self.cache)
    }

    // == Fetch ==
    /// Returns the cached value for `request`, or runs `fetcher` and caches
    /// its result.
    ///
    /// Fetch errors propagate unchanged; nothing is written on failure and
    /// nothing is retried.
    pub async fn fetch<F, Fut, E>(
        &self,
        request: &ApiRequest,
        options: RequestOptions,
        fetcher: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_key(&request.cache_key(), options, fetcher).await
    }

    /// Same as [`fetch`](Self::fetch) for an already-derived key.
    pub async fn fetch_key<F, Fut, E>(
        &self,
        key: &str,
        options: RequestOptions,
        fetcher: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !options.force_refresh {
            let cached = self.cache.write().await.get(key);
            if let Some(data) = cached {
                debug!(key, "data cache hit");
                return Ok(data);
            }
        }

        debug!(key, force_refresh = options.force_refresh, "data cache fetch");
        let data = fetcher().await?;
        self.cache
            .write()
            .await
            .set(key.to_string(), data.clone(), options.ttl);
        Ok(data)
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        self.cache.write().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, data: T, ttl: Option<u64>) {
        self.cache.write().await.set(key, data, ttl);
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.cache.read().await.contains_key(key)
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}
