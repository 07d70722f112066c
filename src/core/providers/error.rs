//! Provider error handling
//!
//! Single error type for every upstream call made by the orchestration layer,
//! whether it targets a completion provider or a quota-limited lookup API.
//!
//! | Variant | Trigger | HTTP Status | Falls through to next provider |
//! |------|------|------------|--------|
//! | Authentication | Rejected credential | 401 / 403 | Yes |
//! | QuotaExceeded | Billing / daily quota rejection | 402 | Yes (key marked exhausted) |
//! | RateLimit | Too many requests | 429 | Yes |
//! | Timeout | Attempt exceeded its budget | 408 / 504 | Yes |
//! | Network | Connection-level failure | - | Yes |
//! | ApiError | Any other non-2xx | 4xx / 5xx | Yes |
//! | ResponseParsing | 2xx with a malformed body | 200 | Yes |
//! | NotConfigured | No credential for this upstream | - | Yes (skipped) |
//!
//! ```rust,ignore
//! use recipe_gateway::core::providers::ProviderError;
//!
//! let err = ProviderError::quota_exceeded("spoonacular", "daily points limit reached");
//! assert!(err.is_quota_rejection());
//! ```

/// Failure of a single upstream call
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    #[error("Quota exceeded for {provider}: {message}")]
    QuotaExceeded { provider: String, message: String },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: String,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Timeout for {provider}: {message}")]
    Timeout { provider: String, message: String },

    #[error("Network error for {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing { provider: String, message: String },

    #[error("Provider {provider} is not configured")]
    NotConfigured { provider: String },
}

impl ProviderError {
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn quota_exceeded(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: match retry_after {
                Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds", seconds),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn not_configured(provider: impl Into<String>) -> Self {
        Self::NotConfigured {
            provider: provider.into(),
        }
    }

    /// Name of the upstream that produced this error
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::QuotaExceeded { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::Network { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::NotConfigured { provider } => provider,
        }
    }

    /// Upstream explicitly refused the credential for quota/billing reasons.
    ///
    /// Only this class removes a credential from rotation immediately; a
    /// plain 429 is a transient throttle and leaves the counter alone.
    pub fn is_quota_rejection(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// HTTP status this error corresponds to, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::QuotaExceeded { .. } => Some(402),
            Self::RateLimit { .. } => Some(429),
            Self::Timeout { .. } => Some(408),
            Self::ApiError { status, .. } => Some(*status),
            Self::Network { .. } | Self::ResponseParsing { .. } | Self::NotConfigured { .. } => {
                None
            }
        }
    }
}
