//! API key handling for provider adapters

use std::future::Future;
use std::sync::Arc;

use crate::config::ProviderSettings;
use crate::core::credentials::{CredentialPool, CredentialRotator};
use crate::core::providers::ProviderError;

/// The key pool one provider draws from.
///
/// A single configured key is a pool of one. Bookkeeping happens around
/// exactly one call; retrying with another key is left to the fallback chain.
#[derive(Debug, Clone)]
pub struct ProviderKeys {
    rotator: Arc<CredentialRotator>,
}

impl ProviderKeys {
    pub fn new(rotator: Arc<CredentialRotator>) -> Self {
        Self { rotator }
    }

    /// Keys named by `settings`, read through `lookup`
    pub fn from_settings<F>(settings: &ProviderSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool = if settings.rotate_keys {
            CredentialPool::discover(&settings.api_key_env, lookup)
        } else {
            CredentialPool::from_values(lookup(&settings.api_key_env))
        };
        Self::new(Arc::new(CredentialRotator::new(
            settings.name.clone(),
            pool,
            settings.daily_limit,
        )))
    }

    /// Fixed key, mostly for tests and ad-hoc clients
    pub fn single(provider: &str, key: impl Into<String>) -> Self {
        let pool = CredentialPool::from_values([key.into()]);
        Self::new(Arc::new(CredentialRotator::new(provider, pool, u32::MAX)))
    }

    pub fn is_empty(&self) -> bool {
        self.rotator.is_empty()
    }

    pub fn rotator(&self) -> &Arc<CredentialRotator> {
        &self.rotator
    }

    /// Run `call` with the current key and record the outcome against it
    pub async fn with_key<T, F, Fut>(&self, provider: &str, call: F) -> Result<T, ProviderError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let key = self
            .rotator
            .select_credential()
            .ok_or_else(|| ProviderError::not_configured(provider))?;

        let result = call(key.clone()).await;
        match &result {
            Ok(_) => self.rotator.record_use(&key),
            Err(e) if e.is_quota_rejection() => self.rotator.record_exhausted(&key),
            Err(_) => {}
        }
        result
    }
}
