//! Cache and Redis configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache-aside policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Namespace prepended to every key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// TTL for query-shaped results (search pages, normalized queries)
    #[serde(default = "default_query_ttl_secs")]
    pub query_ttl_secs: u64,
    /// TTL for results derived from stable inputs (nutrition, conversions)
    #[serde(default = "default_derived_ttl_secs")]
    pub derived_ttl_secs: u64,
    /// Also cache rule-based payloads produced when every provider failed
    #[serde(default)]
    pub cache_degraded: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            query_ttl_secs: default_query_ttl_secs(),
            derived_ttl_secs: default_derived_ttl_secs(),
            cache_degraded: false,
        }
    }
}

impl CacheConfig {
    pub fn query_ttl(&self) -> Option<Duration> {
        ttl_from_secs(self.query_ttl_secs)
    }

    pub fn derived_ttl(&self) -> Option<Duration> {
        ttl_from_secs(self.derived_ttl_secs)
    }
}

/// Zero means "never expires"
fn ttl_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Redis connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Use Redis as the cache store; the in-memory store is used otherwise
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            connection_timeout: default_connection_timeout_secs(),
        }
    }
}
