//! Completion provider adapters
//!
//! Each adapter wraps one upstream completion service with its own
//! authentication, request shape and response shape, and performs a single
//! call per `complete`.

pub mod anthropic;
pub mod base;
pub mod error;
pub mod gemini;
pub mod openai_compatible;
pub mod traits;

pub use anthropic::AnthropicProvider;
pub use base::{HttpClient, ProviderKeys};
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use openai_compatible::OpenAiCompatibleProvider;
pub use traits::{CompletionProvider, CompletionRequest, GenerationParams};

use crate::config::{ProviderKind, ProviderSettings};
use std::sync::Arc;
use tracing::{debug, info};

/// Build the ranked provider list, skipping disabled entries.
///
/// Providers without a key are still built (and reported unconfigured) so
/// attempt records show them as skipped.
pub fn build_providers<F>(
    settings: &[ProviderSettings],
    http: &HttpClient,
    lookup: F,
) -> Vec<Arc<dyn CompletionProvider>>
where
    F: Fn(&str) -> Option<String>,
{
    let providers: Vec<Arc<dyn CompletionProvider>> = settings
        .iter()
        .filter(|s| {
            if !s.enabled {
                debug!("Provider {} disabled", s.name);
            }
            s.enabled
        })
        .map(|s| build_provider(s, http.clone(), ProviderKeys::from_settings(s, &lookup)))
        .collect();

    let configured: Vec<&str> = providers
        .iter()
        .filter(|p| p.is_configured())
        .map(|p| p.name())
        .collect();
    info!(
        "Built {} providers, {} configured: {:?}",
        providers.len(),
        configured.len(),
        configured
    );
    providers
}

pub fn build_provider(
    settings: &ProviderSettings,
    http: HttpClient,
    keys: ProviderKeys,
) -> Arc<dyn CompletionProvider> {
    let settings = settings.clone();
    match settings.kind {
        ProviderKind::OpenaiCompatible => {
            Arc::new(OpenAiCompatibleProvider::new(settings, http, keys))
        }
        ProviderKind::Anthropic => Arc::new(AnthropicProvider::new(settings, http, keys)),
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(settings, http, keys)),
    }
}
