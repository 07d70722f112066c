//! Components shared by every provider adapter

pub mod connection_pool;
pub mod keys;

pub use connection_pool::{HttpClient, PoolConfig, build_headers};
pub use keys::ProviderKeys;
