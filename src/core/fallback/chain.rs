//! Sequential provider fallback

use super::operation::StructuredOperation;
use super::types::{
    AttemptOutcome, AttemptRecord, ChainOutcome, ChainSuccess, Completion, FallbackError,
    PayloadSource,
};
use crate::config::FallbackConfig;
use crate::core::extraction::extract_structured;
use crate::core::providers::{CompletionProvider, CompletionRequest, GenerationParams};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, timeout};
use tracing::{debug, info, warn};

/// Ranked providers plus the time budget for walking them
#[derive(Debug, Clone)]
pub struct FallbackChain {
    providers: Vec<Arc<dyn CompletionProvider>>,
    attempt_timeout: Duration,
    overall_timeout: Duration,
}

impl FallbackChain {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>, config: &FallbackConfig) -> Self {
        Self {
            providers,
            attempt_timeout: config.attempt_timeout(),
            overall_timeout: config.overall_timeout(),
        }
    }

    pub fn providers(&self) -> &[Arc<dyn CompletionProvider>] {
        &self.providers
    }

    /// Names of providers that hold a credential, in priority order
    pub fn configured_providers(&self) -> Vec<&str> {
        self.providers
            .iter()
            .filter(|p| p.is_configured())
            .map(|p| p.name())
            .collect()
    }

    pub fn has_configured(&self) -> bool {
        self.providers.iter().any(|p| p.is_configured())
    }

    /// Try providers in order until one yields a `T` that `accept` approves.
    ///
    /// Never fails: an exhausted chain is reported as an outcome without a
    /// payload. Every provider considered appears in `attempts`, in order.
    pub async fn complete<T, A>(&self, system: &str, user: &str, accept: A) -> ChainOutcome<T>
    where
        T: DeserializeOwned,
        A: Fn(&T) -> bool,
    {
        let request = CompletionRequest::new(system, user);
        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name().to_string();

            if !provider.is_configured() {
                debug!("Skipping unconfigured provider {}", name);
                attempts.push(record(name, AttemptOutcome::Skipped, None, None, Duration::ZERO));
                continue;
            }

            let remaining = self.overall_timeout.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                warn!("Fallback time budget spent before trying {}", name);
                attempts.push(record(
                    name,
                    AttemptOutcome::BudgetExhausted,
                    None,
                    None,
                    Duration::ZERO,
                ));
                continue;
            }

            let budget = self.attempt_timeout.min(remaining);
            let params = provider.generation_params();
            debug!(
                "Trying provider {} (temperature {}, max_tokens {}, budget {:?})",
                name, params.temperature, params.max_tokens, budget
            );
            let params = Some(params);
            let attempt_started = Instant::now();
            let result = timeout(budget, provider.complete(&request)).await;
            let elapsed = attempt_started.elapsed();

            let text = match result {
                Err(_) => {
                    warn!("Provider {} timed out after {:?}", name, budget);
                    attempts.push(record(name, AttemptOutcome::TimedOut, params, None, elapsed));
                    continue;
                }
                Ok(Err(e)) if e.is_timeout() => {
                    warn!("Provider {} timed out: {}", name, e);
                    attempts.push(record(name, AttemptOutcome::TimedOut, params, None, elapsed));
                    continue;
                }
                Ok(Err(e)) => {
                    warn!("Provider {} failed: {}", name, e);
                    let outcome = AttemptOutcome::Failed {
                        error: e.to_string(),
                        status: e.status_code(),
                    };
                    attempts.push(record(name, outcome, params, None, elapsed));
                    continue;
                }
                Ok(Ok(text)) => text,
            };

            match extract_structured::<T>(&text) {
                Ok(extracted) if accept(&extracted.value) => {
                    info!(
                        "Provider {} succeeded ({} extraction) in {:?}",
                        name, extracted.tier, elapsed
                    );
                    let outcome = AttemptOutcome::Succeeded {
                        tier: extracted.tier,
                    };
                    attempts.push(record(name.clone(), outcome, params, Some(text), elapsed));
                    return ChainOutcome {
                        payload: Some(ChainSuccess {
                            value: extracted.value,
                            provider: name,
                            tier: extracted.tier,
                        }),
                        attempts,
                    };
                }
                Ok(extracted) => {
                    warn!("Provider {} payload failed structural checks", name);
                    let outcome = AttemptOutcome::Rejected {
                        tier: extracted.tier,
                    };
                    attempts.push(record(name, outcome, params, Some(text), elapsed));
                }
                Err(e) => {
                    warn!("Provider {} returned no usable payload: {}", name, e);
                    let outcome = AttemptOutcome::Unparseable {
                        error: e.to_string(),
                    };
                    attempts.push(record(name, outcome, params, Some(text), elapsed));
                }
            }
        }

        ChainOutcome {
            payload: None,
            attempts,
        }
    }

    /// Run one logical operation, degrading to its rule-based payload when
    /// every provider fails.
    ///
    /// Only a chain with zero configured providers is an error.
    pub async fn run<O>(
        &self,
        operation: &O,
        input: &O::Input,
    ) -> Result<Completion<O::Output>, FallbackError>
    where
        O: StructuredOperation,
    {
        if !self.has_configured() {
            return Err(FallbackError::NoProvidersConfigured {
                operation: O::NAME.to_string(),
            });
        }

        let system = operation.system_prompt();
        let user = operation.user_prompt(input);
        let outcome = self
            .complete::<O::Output, _>(&system, &user, |output| operation.accept(input, output))
            .await;

        match outcome.payload {
            Some(success) => Ok(Completion {
                value: success.value,
                source: PayloadSource::Provider {
                    name: success.provider,
                    tier: success.tier,
                },
                attempts: outcome.attempts,
            }),
            None => {
                warn!(
                    "All {} provider attempts failed for {}, using rule-based result",
                    outcome.attempts.len(),
                    O::NAME
                );
                Ok(Completion {
                    value: operation.fallback(input),
                    source: PayloadSource::RuleBased,
                    attempts: outcome.attempts,
                })
            }
        }
    }
}

fn record(
    provider: String,
    outcome: AttemptOutcome,
    params: Option<GenerationParams>,
    raw_response: Option<String>,
    elapsed: Duration,
) -> AttemptRecord {
    AttemptRecord {
        provider,
        outcome,
        params,
        raw_response,
        elapsed,
    }
}
