//! `CacheStore` implementation on Redis
//!
//! TTLs map to `SET EX`; pattern deletion walks the keyspace with
//! `SCAN MATCH` so large keyspaces never block the server.

use super::pool::RedisPool;
use crate::storage::{CacheStore, effective_ttl};
use crate::utils::error::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::debug;

const SCAN_BATCH: usize = 500;

#[async_trait]
impl CacheStore for RedisPool {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(None);
        };
        let value: Option<Vec<u8>> = c.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(());
        };
        match effective_ttl(ttl) {
            // SET EX has whole-second resolution; round sub-second TTLs up
            Some(ttl) => {
                let seconds = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
                let _: () = c.set_ex(key, value, seconds).await?;
            }
            None => {
                let _: () = c.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(false);
        };
        let removed: u64 = c.del(key).await?;
        Ok(removed > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(0);
        };

        let mut cursor: u64 = 0;
        let mut removed = 0u64;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(c)
                .await?;

            if !keys.is_empty() {
                let deleted: u64 = c.del(&keys).await?;
                removed += deleted;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Deleted {} Redis keys matching {}", removed, pattern);
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection();
        let Some(ref mut c) = conn.conn else {
            return Ok(false);
        };
        let exists: bool = c.exists(key).await?;
        Ok(exists)
    }
}
