//! Google Gemini `generateContent`

mod provider;

pub use provider::GeminiProvider;
