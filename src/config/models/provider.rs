//! Completion provider and fallback chain configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Request/response shape spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `POST {base}/chat/completions` with bearer auth (OpenAI, Groq, OpenRouter, ...)
    OpenaiCompatible,
    /// `POST {base}/v1/messages`
    Anthropic,
    /// `POST {base}/v1beta/models/{model}:generateContent`
    Gemini,
}

/// One entry of the ranked provider list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Unique name, used in logs and attempt records
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Also pick up `{api_key_env}_2`, `{api_key_env}_3`, ... and rotate between them
    #[serde(default)]
    pub rotate_keys: bool,
    /// Per-key call budget when `rotate_keys` is set
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ProviderSettings {
    pub fn new(
        name: impl Into<String>,
        kind: ProviderKind,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_env: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            base_url: base_url.into(),
            model: model.into(),
            api_key_env: api_key_env.into(),
            rotate_keys: false,
            daily_limit: default_daily_limit(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            headers: HashMap::new(),
            enabled: true,
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Default ranked chain: cheapest and fastest first
pub fn default_providers() -> Vec<ProviderSettings> {
    vec![
        ProviderSettings::new(
            "groq",
            ProviderKind::OpenaiCompatible,
            "https://api.groq.com/openai/v1",
            "llama-3.3-70b-versatile",
            "GROQ_API_KEY",
        ),
        ProviderSettings::new(
            "gemini",
            ProviderKind::Gemini,
            "https://generativelanguage.googleapis.com",
            "gemini-1.5-flash",
            "GEMINI_API_KEY",
        ),
        ProviderSettings::new(
            "openrouter",
            ProviderKind::OpenaiCompatible,
            "https://openrouter.ai/api/v1",
            "meta-llama/llama-3.1-8b-instruct:free",
            "OPENROUTER_API_KEY",
        )
        .with_header("X-Title", "recipe-gateway"),
        ProviderSettings::new(
            "anthropic",
            ProviderKind::Anthropic,
            "https://api.anthropic.com",
            "claude-3-haiku-20240307",
            "ANTHROPIC_API_KEY",
        ),
    ]
}

/// Time budget of the fallback chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Ceiling for a single provider attempt
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Ceiling for all attempts of one logical operation combined
    #[serde(default = "default_overall_timeout_ms")]
    pub overall_timeout_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: default_attempt_timeout_ms(),
            overall_timeout_ms: default_overall_timeout_ms(),
        }
    }
}

impl FallbackConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Duration {
        Duration::from_millis(self.overall_timeout_ms)
    }
}
