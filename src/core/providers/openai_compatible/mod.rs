//! OpenAI-compatible chat completions (OpenAI, Groq, OpenRouter, local servers)

mod provider;

pub use provider::OpenAiCompatibleProvider;
