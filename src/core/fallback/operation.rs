//! Logical operations run through the fallback chain

use serde::Serialize;
use serde::de::DeserializeOwned;

/// One logical operation: its prompts, the shape of its payload, and the
/// rule-based answer used when every provider fails.
///
/// The fallback must satisfy the same structural contract as a provider
/// payload; `accept(input, &fallback(input))` is expected to hold.
pub trait StructuredOperation: Send + Sync {
    type Input: ?Sized + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    /// Used in logs, attempt records and errors
    const NAME: &'static str;

    fn system_prompt(&self) -> String;

    fn user_prompt(&self, input: &Self::Input) -> String;

    /// Structural check applied to provider payloads
    fn accept(&self, _input: &Self::Input, _output: &Self::Output) -> bool {
        true
    }

    fn fallback(&self, input: &Self::Input) -> Self::Output;
}
