//! Multi-provider fallback orchestration
//!
//! Providers are tried one at a time in priority order. The first response
//! that yields an acceptable structured payload wins; when none does, the
//! operation's rule-based payload is returned instead of an error.
//!
//! - `chain` - the sequential attempt loop
//! - `operation` - what one logical operation contributes (prompts, checks, fallback)
//! - `types` - attempt records and results

pub mod chain;
pub mod operation;
pub mod types;


pub use chain::FallbackChain;
pub use operation::StructuredOperation;
pub use types::{
    AttemptOutcome, AttemptRecord, ChainOutcome, ChainSuccess, Completion, FallbackError,
    PayloadSource,
};
