//! Request-handler composition
//!
//! Wires the store, the credential rotator and the fallback chain behind
//! the cache-aside wrapper, in that dependency order.

use crate::config::{CacheConfig, Config};
use crate::core::cache::{CacheAside, CacheKey, CacheStats};
use crate::core::credentials::{CredentialRotator, CredentialStats};
use crate::core::fallback::{Completion, FallbackChain, PayloadSource, StructuredOperation};
use crate::core::operations::text::normalize;
use crate::core::operations::{
    Diet, DietaryConversion, DietaryConverter, DietaryRequest, NormalizedQuery,
    NutritionAnalysis, NutritionAnalyzer, RecipeSummary, RecommendationContext,
    RecommendationGenerator, Recommendations, SearchQueryNormalizer,
};
use crate::core::providers::{HttpClient, build_providers};
use crate::core::search::{RecipeSearchClient, SEARCH_PROVIDER};
use crate::storage::{CacheStore, build_store};
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Operation result as returned to request handlers and cached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer<T> {
    pub value: T,
    pub source: PayloadSource,
}

impl<T> Answer<T> {
    pub fn is_degraded(&self) -> bool {
        self.source == PayloadSource::RuleBased
    }
}

impl<T> From<Completion<T>> for Answer<T> {
    fn from(completion: Completion<T>) -> Self {
        Self {
            value: completion.value,
            source: completion.source,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Ttl {
    /// Query-shaped, volatile results
    Query,
    /// Identifier-keyed, stable results
    Derived,
}

pub struct RecipeAssistant {
    cache: CacheAside,
    chain: FallbackChain,
    search: RecipeSearchClient,
    config: CacheConfig,
}

impl RecipeAssistant {
    pub fn new(
        cache: CacheAside,
        chain: FallbackChain,
        search: RecipeSearchClient,
        config: CacheConfig,
    ) -> Self {
        Self {
            cache,
            chain,
            search,
            config,
        }
    }

    /// Build everything from configuration and the process environment
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = build_store(&config.redis).await;
        Self::with_store(config, store, |key| std::env::var(key).ok())
    }

    /// Build on top of an existing store, reading credentials through `lookup`
    pub fn with_store<F>(config: &Config, store: Arc<dyn CacheStore>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_http = HttpClient::new(config.fallback.attempt_timeout())?;
        let providers = build_providers(&config.providers, &llm_http, &lookup);
        let chain = FallbackChain::new(providers, &config.fallback);
        if !chain.has_configured() {
            warn!("No completion provider has a key; AI operations will fail");
        }

        let rotator = Arc::new(CredentialRotator::from_config(
            SEARCH_PROVIDER,
            &config.credentials,
            &lookup,
        ));
        info!(
            "Recipe search using {} key(s), limit {} per key",
            rotator.pool().len(),
            config.credentials.daily_limit
        );
        let search_http = HttpClient::new(config.search.timeout())?;
        let search = RecipeSearchClient::new(config.search.clone(), search_http, rotator);

        Ok(Self::new(
            CacheAside::new(store),
            chain,
            search,
            config.cache.clone(),
        ))
    }

    fn key(&self, operation: &str) -> CacheKey {
        CacheKey::new(&self.config.key_prefix, operation)
    }

    fn ttl(&self, ttl: Ttl) -> Option<Duration> {
        match ttl {
            Ttl::Query => self.config.query_ttl(),
            Ttl::Derived => self.config.derived_ttl(),
        }
    }

    async fn run_cached<O>(
        &self,
        key: CacheKey,
        ttl: Ttl,
        operation: O,
        input: &O::Input,
    ) -> Result<Answer<O::Output>>
    where
        O: StructuredOperation,
    {
        let cache_degraded = self.config.cache_degraded;
        let chain = &self.chain;
        let operation = &operation;
        self.cache
            .with_cache_if(
                &key.build(),
                self.ttl(ttl),
                move || async move {
                    let completion = chain.run(operation, input).await?;
                    Ok::<_, GatewayError>(Answer::from(completion))
                },
                |answer: &Answer<O::Output>| cache_degraded || !answer.is_degraded(),
            )
            .await
    }

    /// Free text to search parameters
    pub async fn normalize_query(&self, text: &str) -> Result<Answer<NormalizedQuery>> {
        if text.trim().is_empty() {
            return Err(GatewayError::invalid_request("search text is empty"));
        }
        let key = self.key(SearchQueryNormalizer::NAME).param("q", text);
        self.run_cached(key, Ttl::Query, SearchQueryNormalizer, text)
            .await
    }

    /// Dish suggestions for the current weather
    pub async fn recommend(
        &self,
        context: &RecommendationContext,
    ) -> Result<Answer<Recommendations>> {
        let mut preferences: Vec<String> = context
            .preferences
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        preferences.sort();
        preferences.dedup();

        let key = self
            .key(RecommendationGenerator::NAME)
            .param_opt("temp", context.temperature_c.map(|t| format!("{:.1}", t)))
            .param_opt("condition", context.condition.as_deref())
            .param_opt("meal", context.meal.as_deref())
            .param("prefs", preferences.join(","));
        self.run_cached(key, Ttl::Query, RecommendationGenerator, context)
            .await
    }

    pub async fn analyze_nutrition(
        &self,
        recipe: &RecipeSummary,
    ) -> Result<Answer<NutritionAnalysis>> {
        validate_recipe(recipe)?;
        let key = recipe_key(self.key(NutritionAnalyzer::NAME), recipe);
        self.run_cached(key, Ttl::Derived, NutritionAnalyzer, recipe)
            .await
    }

    pub async fn convert_diet(
        &self,
        recipe: &RecipeSummary,
        diet: Diet,
    ) -> Result<Answer<DietaryConversion>> {
        validate_recipe(recipe)?;
        let key = recipe_key(self.key(DietaryConverter::NAME), recipe).param("diet", diet);
        let request = DietaryRequest {
            recipe: recipe.clone(),
            diet,
        };
        self.run_cached(key, Ttl::Derived, DietaryConverter, &request)
            .await
    }

    /// One page of recipe search results, cached for the query TTL
    pub async fn search(&self, term: &str, page: u32) -> Result<Value> {
        if term.trim().is_empty() {
            return Err(GatewayError::invalid_request("search term is empty"));
        }
        let page = page.max(1);
        let key = self.key("search").segment(term).param("page", page);
        let search = &self.search;

        self.cache
            .with_cache(&key.build(), self.ttl(Ttl::Query), move || async move {
                if search.rotator().is_empty() {
                    return Err(GatewayError::NoCredentials(SEARCH_PROVIDER.to_string()));
                }
                Ok::<_, GatewayError>(search.search(term, page).await?)
            })
            .await
    }

    /// Drop every cached page for `term`
    pub async fn invalidate_search(&self, term: &str) -> Result<u64> {
        let scope = self.key("search").segment(term).scope_prefix();
        self.cache.invalidate_prefix(&scope).await
    }

    pub fn credential_stats(&self) -> Vec<CredentialStats> {
        self.search.rotator().stats()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Completion providers holding a key, in priority order
    pub fn configured_providers(&self) -> Vec<&str> {
        self.chain.configured_providers()
    }
}

fn validate_recipe(recipe: &RecipeSummary) -> Result<()> {
    if recipe.title.trim().is_empty() {
        return Err(GatewayError::invalid_request("recipe title is empty"));
    }
    if recipe.ingredients.iter().all(|i| i.trim().is_empty()) {
        return Err(GatewayError::invalid_request(
            "recipe needs at least one ingredient",
        ));
    }
    Ok(())
}

/// Ingredient order does not change the analysis, so it does not change the key
fn recipe_key(key: CacheKey, recipe: &RecipeSummary) -> CacheKey {
    let mut ingredients: Vec<String> = recipe
        .ingredients
        .iter()
        .map(|i| normalize(i))
        .filter(|i| !i.is_empty())
        .collect();
    ingredients.sort();

    key.param("title", &recipe.title)
        .param("ingredients", ingredients.join("|"))
        .param_opt("servings", recipe.servings)
}
