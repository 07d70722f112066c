//! Credential pool and recipe search upstream configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When per-credential usage counters start over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaWindow {
    /// Counters only reset when the whole pool is exhausted
    #[default]
    Lifetime,
    /// Counters also reset individually at each UTC day boundary
    Daily,
}

impl std::str::FromStr for QuotaWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lifetime" => Ok(Self::Lifetime),
            "daily" => Ok(Self::Daily),
            other => Err(format!("Unknown quota window: {}", other)),
        }
    }
}

/// Key pool for the quota-limited recipe search upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Environment variable holding the first key; successors use `_2`, `_3`, ...
    #[serde(default = "default_credential_prefix")]
    pub env_prefix: String,
    /// Calls allowed per key before it is considered exhausted
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default)]
    pub window: QuotaWindow,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            env_prefix: default_credential_prefix(),
            daily_limit: default_daily_limit(),
            window: QuotaWindow::default(),
        }
    }
}

/// Recipe search upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_path")]
    pub path: String,
    #[serde(default = "default_results_per_page")]
    pub results_per_page: u32,
    /// Request timeout in milliseconds
    #[serde(default = "default_attempt_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base_url(),
            path: default_search_path(),
            results_per_page: default_results_per_page(),
            timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
