//! Redis connection management
//!
//! This module provides Redis connectivity and health checks.

use crate::config::RedisConfig;
use crate::utils::error::{GatewayError, Result};
use crate::utils::logging::sanitize_url;
use redis::{Client, aio::MultiplexedConnection};
use std::time::Duration;
use tracing::{debug, info};

/// Redis connection pool (supports no-op mode when Redis is unavailable)
#[derive(Clone)]
pub struct RedisPool {
    /// Multiplexed connection (None in no-op mode)
    pub(crate) connection: Option<MultiplexedConnection>,
    /// Configuration
    pub(crate) config: RedisConfig,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("url", &sanitize_url(&self.config.url))
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// Redis connection wrapper
pub struct RedisConnection {
    pub(crate) conn: Option<MultiplexedConnection>,
}

impl RedisPool {
    /// Connect to Redis, bounded by the configured connection timeout
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        info!("Creating Redis connection pool");
        debug!("Redis URL: {}", sanitize_url(&config.url));

        let client = Client::open(config.url.as_str())?;

        let timeout = Duration::from_secs(config.connection_timeout.max(1));
        let connection = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| {
                GatewayError::cache(format!(
                    "Timed out connecting to Redis after {}s",
                    timeout.as_secs()
                ))
            })??;

        info!("Redis connection pool created successfully");
        Ok(Self {
            connection: Some(connection),
            config: config.clone(),
        })
    }

    /// Create a no-op Redis pool: reads miss, writes are dropped
    pub fn create_noop() -> Self {
        info!("Creating no-op Redis pool (Redis unavailable)");
        Self {
            connection: None,
            config: RedisConfig::default(),
        }
    }

    /// Check if this is a no-op pool
    pub fn is_noop(&self) -> bool {
        self.connection.is_none()
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> RedisConnection {
        RedisConnection {
            conn: self.connection.clone(),
        }
    }

    /// Health check
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            debug!("Redis health check skipped (no-op mode)");
            return Ok(());
        };

        let _: String = redis::cmd("PING").query_async(c).await?;
        debug!("Redis health check passed");
        Ok(())
    }
}
