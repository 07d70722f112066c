//! Validators for each configuration section

use super::Validate;
use crate::config::Config;
use crate::config::models::*;
use std::collections::HashSet;
use tracing::debug;

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating gateway configuration");

        self.cache.validate()?;
        self.redis.validate()?;
        self.credentials.validate()?;
        self.search.validate()?;
        self.fallback.validate()?;

        let mut names = HashSet::new();
        for provider in &self.providers {
            if !names.insert(provider.name.as_str()) {
                return Err(format!("Duplicate provider name: {}", provider.name));
            }
            provider.validate()?;
        }

        debug!("Gateway configuration validation completed");
        Ok(())
    }
}

impl Validate for CacheConfig {
    fn validate(&self) -> Result<(), String> {
        if self.key_prefix.trim().is_empty() {
            return Err("Cache key prefix cannot be empty".to_string());
        }
        if self.key_prefix.contains(['*', '?', '[', ']']) {
            return Err("Cache key prefix cannot contain glob characters".to_string());
        }
        for (name, secs) in [
            ("query", self.query_ttl_secs),
            ("derived", self.derived_ttl_secs),
        ] {
            if secs > MAX_CACHE_TTL_SECS {
                return Err(format!(
                    "Cache {} TTL cannot exceed {} seconds",
                    name, MAX_CACHE_TTL_SECS
                ));
            }
        }
        Ok(())
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("Redis URL must start with redis:// or rediss://".to_string());
        }
        if self.connection_timeout == 0 {
            return Err("Redis connection timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for CredentialConfig {
    fn validate(&self) -> Result<(), String> {
        if self.env_prefix.trim().is_empty() {
            return Err("Credential environment prefix cannot be empty".to_string());
        }
        if self.daily_limit == 0 {
            return Err("Credential daily limit must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for SearchConfig {
    fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid search base URL '{}': {}", self.base_url, e))?;
        if self.results_per_page == 0 {
            return Err("Search results per page must be greater than 0".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("Search timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for FallbackConfig {
    fn validate(&self) -> Result<(), String> {
        if self.attempt_timeout_ms == 0 {
            return Err("Fallback attempt timeout must be greater than 0".to_string());
        }
        if self.overall_timeout_ms < self.attempt_timeout_ms {
            return Err(format!(
                "Fallback overall timeout ({}ms) must be at least the attempt timeout ({}ms)",
                self.overall_timeout_ms, self.attempt_timeout_ms
            ));
        }
        Ok(())
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Provider name cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err(format!("Provider {} has no model", self.name));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(format!("Provider {} has no api_key_env", self.name));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| format!("Provider {} has invalid base URL: {}", self.name, e))?;
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "Provider {} temperature must be between 0 and 2",
                self.name
            ));
        }
        if self.max_tokens == 0 {
            return Err(format!(
                "Provider {} max_tokens must be greater than 0",
                self.name
            ));
        }
        if self.rotate_keys && self.daily_limit == 0 {
            return Err(format!(
                "Provider {} daily_limit must be greater than 0",
                self.name
            ));
        }
        Ok(())
    }
}
