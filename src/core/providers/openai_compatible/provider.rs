use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use crate::config::ProviderSettings;
use crate::core::providers::base::{HttpClient, ProviderKeys, build_headers};
use crate::core::providers::{
    CompletionProvider, CompletionRequest, GenerationParams, ProviderError,
};

/// `POST {base_url}/chat/completions` with bearer authentication
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    settings: ProviderSettings,
    http: HttpClient,
    keys: ProviderKeys,
}

impl OpenAiCompatibleProvider {
    pub fn new(settings: ProviderSettings, http: HttpClient, keys: ProviderKeys) -> Self {
        Self {
            settings,
            http,
            keys,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    pub fn transform_request(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        })
    }

    /// Content of the first choice
    pub fn transform_response(&self, response: &Value) -> Result<String, ProviderError> {
        let text = response
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::response_parsing(
                &self.settings.name,
                "response has no message content",
            ));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
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
                let headers = build_headers(
                    name,
                    "authorization",
                    &format!("Bearer {}", key),
                    &self.settings.headers,
                )?;
                self.http.post_json(name, &url, headers, &body).await
            })
            .await?;

        debug!("{} returned a completion", name);
        self.transform_response(&response)
    }
}
