//! Cache-aside memoization of expensive upstream results
//!
//! The caller checks the store, runs the producer on a miss and writes the
//! result back; the store itself never computes anything.
//!
//! - `aside` - the `CacheAside` wrapper
//! - `key` - composite key construction
//! - `types` - statistics

pub mod aside;
pub mod key;
pub mod types;


pub use aside::CacheAside;
pub use key::CacheKey;
pub use types::{AtomicCacheStats, CacheStats};
