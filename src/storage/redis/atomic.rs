//! Redis atomic counters

use super::pool::RedisPool;
use crate::utils::error::Result;
use redis::AsyncCommands;

impl RedisPool {
    /// Increment a counter by `delta`, setting `ttl_secs` when the key is new.
    ///
    /// Returns the counter value after the increment. This is the primitive
    /// for sharing credential usage between gateway instances: one key per
    /// credential and day (`{prefix}:quota:{masked}:{date}`) expiring with
    /// the window. `CredentialRotator` keeps its counts in process and does
    /// not call it. In no-op mode the counter never persists and `delta` is
    /// returned.
    pub async fn increment(&self, key: &str, delta: i64, ttl_secs: Option<u64>) -> Result<i64> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(delta);
        };

        let value: i64 = c.incr(key, delta).await?;
        if let Some(ttl) = ttl_secs.filter(|t| *t > 0) {
            if value == delta {
                let _: bool = c.expire(key, ttl as i64).await?;
            }
        }
        Ok(value)
    }
}
