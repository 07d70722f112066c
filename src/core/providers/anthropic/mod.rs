//! Anthropic messages API

mod provider;

pub use provider::{ANTHROPIC_VERSION, AnthropicProvider};
