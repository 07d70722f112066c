//! Redis storage implementation
//!
//! ## Module Structure
//!
//! - `pool` - Connection management and health checks
//! - `cache` - `CacheStore` operations (get, set, delete, delete_pattern, exists)
//! - `atomic` - Atomic counters
//! - `tests` - Module tests

mod atomic;
mod cache;
mod pool;

pub use pool::{RedisConnection, RedisPool};
