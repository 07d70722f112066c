use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ProviderSettings;
use crate::core::providers::base::{HttpClient, ProviderKeys, build_headers};
use crate::core::providers::{
    CompletionProvider, CompletionRequest, GenerationParams, ProviderError,
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `POST {base_url}/v1/messages` with `x-api-key` authentication
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    settings: ProviderSettings,
    http: HttpClient,
    keys: ProviderKeys,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings, http: HttpClient, keys: ProviderKeys) -> Self {
        Self {
            settings,
            http,
            keys,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }

    pub fn transform_request(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.settings.model,
            "system": request.system,
            "messages": [
                { "role": "user", "content": request.user },
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        })
    }

    /// Concatenated text blocks of the response
    pub fn transform_response(&self, response: &Value) -> Result<String, ProviderError> {
        let text: String = response
            .get("content")
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|b| b.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::response_parsing(
                &self.settings.name,
                "response has no text content",
            ));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn is_configured(&self) -> bool {
        !self.keys.is_empty()
    }

    fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let name = self.name();
        let body = self.transform_request(request);
        let url = self.endpoint();

        let response = self
            .keys
            .with_key(name, |key| async move {
                let mut headers = build_headers(name, "x-api-key", &key, &self.settings.headers)?;
                headers.insert(
                    "anthropic-version",
                    HeaderValue::from_static(ANTHROPIC_VERSION),
                );
                self.http.post_json(name, &url, headers, &body).await
            })
            .await?;

        debug!("{} returned a completion", name);
        self.transform_response(&response)
    }
}
