//! Completion provider abstraction

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use super::ProviderError;

/// One prompt pair sent to a completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Provider constants applied to every request; callers cannot tune them
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// An upstream completion service.
///
/// `complete` performs exactly one upstream call. Retrying elsewhere is the
/// job of the fallback chain.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Whether a credential is present for this provider
    fn is_configured(&self) -> bool;

    fn generation_params(&self) -> GenerationParams;

    /// Raw text of the first completion
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
