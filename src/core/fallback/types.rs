//! Fallback attempt records and results

use crate::core::extraction::ExtractionTier;
use crate::core::providers::GenerationParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error surfaced by the fallback chain itself.
///
/// Runtime provider failures never surface; only configuration does.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    #[error("no completion providers configured for {operation}")]
    NoProvidersConfigured { operation: String },
}

/// What happened when one provider was tried
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// A payload was extracted and accepted
    Succeeded { tier: ExtractionTier },
    /// No credential present, provider not called
    Skipped,
    /// Attempt exceeded its time budget
    TimedOut,
    /// Transport or HTTP failure
    Failed {
        error: String,
        status: Option<u16>,
    },
    /// Response contained no parseable payload
    Unparseable { error: String },
    /// Payload parsed but failed the operation's structural check
    Rejected { tier: ExtractionTier },
    /// Overall time budget spent before this provider could be tried
    BudgetExhausted,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// One provider attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptRecord {
    pub provider: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    /// Generation constants the provider was called with; absent when it
    /// was never called
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<GenerationParams>,
    /// Raw response text, when the provider answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}

/// Provider payload that ended the chain
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSuccess<T> {
    pub value: T,
    pub provider: String,
    pub tier: ExtractionTier,
}

/// Result of walking the chain once
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOutcome<T> {
    pub payload: Option<ChainSuccess<T>>,
    pub attempts: Vec<AttemptRecord>,
}

impl<T> ChainOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.payload.is_some()
    }
}

/// Where a returned payload came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadSource {
    Provider { name: String, tier: ExtractionTier },
    /// Synthesized locally after every provider failed
    RuleBased,
}

/// Payload of one logical operation plus how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion<T> {
    pub value: T,
    pub source: PayloadSource,
    pub attempts: Vec<AttemptRecord>,
}

impl<T> Completion<T> {
    /// True when the payload is the rule-based fallback
    pub fn is_degraded(&self) -> bool {
        self.source == PayloadSource::RuleBased
    }
}
