//! Shared HTTP client and upstream status mapping

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::providers::ProviderError;
use crate::utils::logging::sanitize_url;

/// Connection pool settings
pub struct PoolConfig;
impl PoolConfig {
    pub const CONNECT_TIMEOUT_SECS: u64 = 5;
    pub const POOL_SIZE: usize = 16;
    pub const KEEPALIVE_SECS: u64 = 90;
}

/// Error bodies longer than this are cut before landing in an error message
const MAX_ERROR_BODY: usize = 300;

/// Pooled `reqwest` client, cheap to clone
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(PoolConfig::CONNECT_TIMEOUT_SECS))
            .pool_idle_timeout(Duration::from_secs(PoolConfig::KEEPALIVE_SECS))
            .pool_max_idle_per_host(PoolConfig::POOL_SIZE)
            .user_agent(concat!("recipe-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::network("http", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// POST a JSON body and decode a JSON response
    pub async fn post_json(
        &self,
        provider: &str,
        url: &str,
        headers: HeaderMap,
        body: &Value,
    ) -> Result<Value, ProviderError> {
        let request = self.client.post(url).headers(headers).json(body);
        self.send(provider, url, request).await
    }

    /// GET with query parameters and decode a JSON response
    pub async fn get_json(
        &self,
        provider: &str,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, String)],
    ) -> Result<Value, ProviderError> {
        let request = self.client.get(url).headers(headers).query(query);
        self.send(provider, url, request).await
    }

    async fn send(
        &self,
        provider: &str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Value, ProviderError> {
        debug!("{} request to {}", provider, sanitize_url(url));

        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(provider, &e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(provider, &e))?;

        if !status.is_success() {
            return Err(map_http_error(provider, status, &headers, &text));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::response_parsing(provider, format!("Invalid JSON body: {}", e))
        })
    }
}

/// Auth header plus configured extras; unparseable extras are skipped
pub fn build_headers(
    provider: &str,
    auth_name: &'static str,
    auth_value: &str,
    extra: &HashMap<String, String>,
) -> Result<HeaderMap, ProviderError> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(auth_value).map_err(|_| {
        ProviderError::authentication(provider, "API key contains invalid header characters")
    })?;
    value.set_sensitive(true);
    headers.insert(HeaderName::from_static(auth_name), value);

    for (name, value) in extra {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!("Skipping invalid header {} for {}", name, provider),
        }
    }

    Ok(headers)
}

/// Map a non-2xx response onto the error taxonomy
pub fn map_http_error(
    provider: &str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> ProviderError {
    let message = truncate(body);
    match status.as_u16() {
        401 | 403 => ProviderError::authentication(provider, message),
        402 => ProviderError::quota_exceeded(provider, message),
        429 => ProviderError::rate_limit(provider, retry_after(headers)),
        408 | 504 => ProviderError::timeout(provider, message),
        code => ProviderError::api_error(provider, code, message),
    }
}

/// Map a transport failure (no usable response)
pub fn map_transport_error(provider: &str, error: &reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(provider, error.to_string())
    } else {
        ProviderError::network(provider, error.to_string())
    }
}

/// `Retry-After` in seconds; HTTP-date values are ignored
fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY).collect();
    cut.push_str("...");
    cut
}
