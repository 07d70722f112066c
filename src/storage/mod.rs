//! Key-value storage backing the cache-aside layer
//!
//! - `memory` - in-process store with per-entry expiry
//! - `redis` - Redis-backed store (feature `redis`)
//! - `pattern` - Redis-style glob matching used for bulk deletion

pub mod memory;
pub mod pattern;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis::RedisPool;

use crate::config::RedisConfig;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "redis")]
use tracing::warn;
use tracing::info;

/// Byte-oriented key-value store with per-entry TTL.
///
/// An expired entry must be indistinguishable from a missing one. A TTL of
/// `None` or zero means the entry never expires.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Returns whether a live entry was removed
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Delete every key matching a glob pattern, returning how many were removed
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;

    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Effective TTL: zero-length durations mean "no expiry"
pub(crate) fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|d| !d.is_zero())
}

/// Build the configured store, falling back to memory when Redis is unusable
pub async fn build_store(config: &RedisConfig) -> Arc<dyn CacheStore> {
    if !config.enabled {
        info!("Redis disabled, using in-memory cache store");
        return Arc::new(MemoryStore::new());
    }

    #[cfg(feature = "redis")]
    {
        match RedisPool::new(config).await {
            Ok(pool) => match pool.health_check().await {
                Ok(()) => {
                    info!("Using Redis cache store");
                    return Arc::new(pool);
                }
                Err(e) => warn!("Redis health check failed, using in-memory cache store: {}", e),
            },
            Err(e) => warn!("Redis connection failed, using in-memory cache store: {}", e),
        }
    }

    #[cfg(not(feature = "redis"))]
    {
        info!("Built without Redis support, using in-memory cache store");
    }

    Arc::new(MemoryStore::new())
}
