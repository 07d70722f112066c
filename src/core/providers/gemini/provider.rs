use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::core::providers::base::{HttpClient, ProviderKeys, build_headers};
use crate::core::providers::{
    CompletionProvider, CompletionRequest, GenerationParams, ProviderError,
};

/// `POST {base_url}/v1beta/models/{model}:generateContent`, key in `x-goog-api-key`
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    settings: ProviderSettings,
    http: HttpClient,
    keys: ProviderKeys,
}

impl GeminiProvider {
    pub fn new(settings: ProviderSettings, http: HttpClient, keys: ProviderKeys) -> Self {
        Self {
            settings,
            http,
            keys,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    pub fn transform_request(&self, request: &CompletionRequest) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": request.system }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user }]
            }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
            }
        })
    }

    /// Text parts of the first candidate
    pub fn transform_response(&self, response: &Value) -> Result<String, ProviderError> {
        if let Some(reason) = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            warn!("{} blocked the prompt: {}", self.settings.name, reason);
            return Err(ProviderError::response_parsing(
                &self.settings.name,
                format!("prompt blocked: {}", reason),
            ));
        }

        let text: String = response
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ProviderError::response_parsing(
                &self.settings.name,
                "response has no candidate text",
            ));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
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
                let headers = build_headers(name, "x-goog-api-key", &key, &self.settings.headers)?;
                self.http.post_json(name, &url, headers, &body).await
            })
            .await?;

        debug!("{} returned a completion", name);
        self.transform_response(&response)
    }
}
