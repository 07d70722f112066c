//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

pub mod cache;
pub mod credentials;
pub mod logging;
pub mod provider;

pub use cache::*;
pub use credentials::*;
pub use logging::*;
pub use provider::*;

/// Short-lived results keyed by free-form queries
pub fn default_query_ttl_secs() -> u64 {
    30 * 60
}

/// Results keyed by stable identifiers or derived from them
pub fn default_derived_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Longest configurable cache TTL (one year)
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

pub fn default_key_prefix() -> String {
    "recipes".to_string()
}

pub fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

pub fn default_connection_timeout_secs() -> u64 {
    5
}

pub fn default_daily_limit() -> u32 {
    150
}

pub fn default_credential_prefix() -> String {
    "SPOONACULAR_API_KEY".to_string()
}

pub fn default_search_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

pub fn default_search_path() -> String {
    "/recipes/complexSearch".to_string()
}

pub fn default_results_per_page() -> u32 {
    12
}

pub fn default_attempt_timeout_ms() -> u64 {
    8_000
}

pub fn default_overall_timeout_ms() -> u64 {
    20_000
}

pub fn default_temperature() -> f32 {
    0.3
}

pub fn default_max_tokens() -> u32 {
    1024
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}
