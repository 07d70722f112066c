//! Quota-limited recipe search upstream
//!
//! Every request draws a key from the rotator; a 402 takes that key out of
//! rotation and the request is retried with the next one.

use crate::config::SearchConfig;
use crate::core::credentials::CredentialRotator;
use crate::core::providers::base::build_headers;
use crate::core::providers::{HttpClient, ProviderError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub const SEARCH_PROVIDER: &str = "recipe_search";

#[derive(Debug, Clone)]
pub struct RecipeSearchClient {
    config: SearchConfig,
    http: HttpClient,
    rotator: Arc<CredentialRotator>,
}

impl RecipeSearchClient {
    pub fn new(config: SearchConfig, http: HttpClient, rotator: Arc<CredentialRotator>) -> Self {
        Self {
            config,
            http,
            rotator,
        }
    }

    pub fn rotator(&self) -> &Arc<CredentialRotator> {
        &self.rotator
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.path.trim_start_matches('/')
        )
    }

    /// One page (1-based) of results for `query`, returned as the upstream sent it
    pub async fn search(&self, query: &str, page: u32) -> Result<Value, ProviderError> {
        let page = page.max(1);
        let per_page = self.config.results_per_page;
        let offset = (page - 1).saturating_mul(per_page);
        let url = self.endpoint();
        let params = [
            ("query", query.trim().to_string()),
            ("number", per_page.to_string()),
            ("offset", offset.to_string()),
        ];

        debug!("Searching recipes for '{}' (page {})", query, page);

        self.rotator
            .call_with_rotation(|key| {
                let url = url.clone();
                let params = params.clone();
                async move {
                    let headers = build_headers(SEARCH_PROVIDER, "x-api-key", &key, &HashMap::new())?;
                    self.http
                        .get_json(SEARCH_PROVIDER, &url, headers, &params)
                        .await
                }
            })
            .await
    }
}
