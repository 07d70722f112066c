//! Configuration management for the gateway
//!
//! Configuration is read from a YAML file (every section optional), then
//! overridden by environment variables, then validated.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub credentials: CredentialConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Ranked completion providers, highest priority first
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSettings>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis: RedisConfig::default(),
            cache: CacheConfig::default(),
            credentials: CredentialConfig::default(),
            search: SearchConfig::default(),
            fallback: FallbackConfig::default(),
            providers: default_providers(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| GatewayError::config(format!("Failed to parse config: {}", e)))?;

        config.check()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from defaults and the process environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    /// Optional file, then environment overrides, then validation
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.check()?;
        Ok(config)
    }

    /// Apply overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REDIS_URL") {
            self.redis.url = url;
            self.redis.enabled = true;
        }
        if let Some(enabled) = lookup("REDIS_ENABLED") {
            self.redis.enabled = parse_env("REDIS_ENABLED", &enabled)?;
        }
        if let Some(prefix) = lookup("CACHE_KEY_PREFIX") {
            self.cache.key_prefix = prefix;
        }
        if let Some(ttl) = lookup("CACHE_QUERY_TTL_SECS") {
            self.cache.query_ttl_secs = parse_env("CACHE_QUERY_TTL_SECS", &ttl)?;
        }
        if let Some(ttl) = lookup("CACHE_DERIVED_TTL_SECS") {
            self.cache.derived_ttl_secs = parse_env("CACHE_DERIVED_TTL_SECS", &ttl)?;
        }
        if let Some(prefix) = lookup("CREDENTIAL_ENV_PREFIX") {
            self.credentials.env_prefix = prefix;
        }
        if let Some(limit) = lookup("CREDENTIAL_DAILY_LIMIT") {
            self.credentials.daily_limit = parse_env("CREDENTIAL_DAILY_LIMIT", &limit)?;
        }
        if let Some(window) = lookup("CREDENTIAL_QUOTA_WINDOW") {
            self.credentials.window = window.parse().map_err(GatewayError::Config)?;
        }
        if let Some(base_url) = lookup("SEARCH_BASE_URL") {
            self.search.base_url = base_url;
        }
        if let Some(timeout) = lookup("FALLBACK_ATTEMPT_TIMEOUT_MS") {
            self.fallback.attempt_timeout_ms = parse_env("FALLBACK_ATTEMPT_TIMEOUT_MS", &timeout)?;
        }
        if let Some(timeout) = lookup("FALLBACK_OVERALL_TIMEOUT_MS") {
            self.fallback.overall_timeout_ms = parse_env("FALLBACK_OVERALL_TIMEOUT_MS", &timeout)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("LOG_JSON") {
            self.logging.json = parse_env("LOG_JSON", &json)?;
        }
        Ok(())
    }

    /// Validate the entire configuration
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(GatewayError::Config)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::config(format!("Invalid {}: {}", key, e)))
}
