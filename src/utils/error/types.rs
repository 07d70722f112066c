//! Error types for the gateway

use crate::core::fallback::FallbackError;
use crate::core::providers::ProviderError;
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Upstream call errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Fallback chain errors
    #[error("Fallback error: {0}")]
    Fallback(#[from] FallbackError),

    /// No credential configured for an upstream family
    #[error("No credentials configured: {0}")]
    NoCredentials(String),

    /// Invalid request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Whether this failure comes from deployment configuration rather
    /// than from a runtime condition that may clear on its own
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Self::Config(_) | Self::NoCredentials(_) => true,
            Self::Fallback(FallbackError::NoProvidersConfigured { .. }) => true,
            Self::Provider(ProviderError::NotConfigured { .. }) => true,
            _ => false,
        }
    }
}
