//! Cache-aside wrapper
//!
//! Values are stored as JSON. A read always precedes the producer and a
//! write only ever follows a successful producer, so failures are never
//! cached. The store is an optimization: read errors degrade to misses and
//! write errors are logged, never surfaced.

use super::types::{AtomicCacheStats, CacheStats};
use crate::storage::CacheStore;
use crate::storage::pattern::escape_glob;
use crate::utils::error::{GatewayError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Memoizes producer results in a `CacheStore`
#[derive(Clone)]
pub struct CacheAside {
    store: Arc<dyn CacheStore>,
    stats: Arc<AtomicCacheStats>,
}

impl CacheAside {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            stats: Arc::new(AtomicCacheStats::default()),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Return the cached value for `key`, or run `producer` once and cache
    /// its result for `ttl` (`None` = no expiry).
    ///
    /// A producer error is returned unchanged and nothing is written.
    pub async fn with_cache<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<GatewayError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.with_cache_if(key, ttl, producer, |_| true).await
    }

    /// Like [`with_cache`](Self::with_cache), but the computed value is only
    /// written when `should_store` accepts it. The value is returned either way.
    pub async fn with_cache_if<T, E, F, Fut, S>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        producer: F,
        should_store: S,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<GatewayError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        S: FnOnce(&T) -> bool,
    {
        if key.is_empty() {
            return Err(GatewayError::invalid_request("cache key cannot be empty").into());
        }

        if let Some(value) = self.lookup::<T>(key).await {
            return Ok(value);
        }

        let value = producer().await?;

        if should_store(&value) {
            self.write(key, &value, ttl).await;
        } else {
            debug!("Not caching value for key: {}", key);
        }

        Ok(value)
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
                Ok(value) => {
                    AtomicCacheStats::bump(&self.stats.hits);
                    debug!("Cache hit for key: {}", key);
                    return Some(value);
                }
                Err(e) => {
                    AtomicCacheStats::bump(&self.stats.decode_failures);
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                AtomicCacheStats::bump(&self.stats.read_failures);
                warn!("Cache read failed for {}, treating as miss: {}", key, e);
            }
        }

        AtomicCacheStats::bump(&self.stats.misses);
        debug!("Cache miss for key: {}", key);
        None
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                AtomicCacheStats::bump(&self.stats.write_failures);
                warn!("Failed to serialize value for {}: {}", key, e);
                return;
            }
        };

        match self.store.set(key, &bytes, ttl).await {
            Ok(()) => {
                AtomicCacheStats::bump(&self.stats.writes);
                debug!("Cached value for key: {} (ttl: {:?})", key, ttl);
            }
            Err(e) => {
                AtomicCacheStats::bump(&self.stats.write_failures);
                warn!("Cache write failed for {}, returning computed value: {}", key, e);
            }
        }
    }

    /// Drop one entry
    pub async fn invalidate(&self, key: &str) -> Result<bool> {
        self.store.delete(key).await
    }

    /// Drop every entry whose key starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<u64> {
        if prefix.is_empty() {
            return Err(GatewayError::invalid_request(
                "refusing to invalidate with an empty prefix",
            ));
        }
        let pattern = format!("{}*", escape_glob(prefix));
        let removed = self.store.delete_pattern(&pattern).await?;
        debug!("Invalidated {} entries under {}", removed, prefix);
        Ok(removed)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
