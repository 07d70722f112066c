//! End-to-end behaviour of the composed assistant: cache in front of the
//! fallback chain and the key-rotating search client

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        ANTHROPIC_PATH, GEMINI_PATH, GROQ_PATH, SEARCH_PATH, anthropic_reply, gemini_reply,
        lookup_from, mock_config, openai_reply, search_results,
    };
    use crate::common::{Script, ScriptedProvider};
    use crate::{assert_err, assert_ok};
    use recipe_gateway::config::{CacheConfig, FallbackConfig, SearchConfig};
    use recipe_gateway::core::credentials::{CredentialPool, CredentialRotator};
    use recipe_gateway::core::extraction::ExtractionTier;
    use recipe_gateway::core::fallback::FallbackError;
    use recipe_gateway::core::operations::{Diet, RecipeSummary, RecommendationContext};
    use recipe_gateway::core::providers::{CompletionProvider, HttpClient};
    use recipe_gateway::core::search::RecipeSearchClient;
    use recipe_gateway::{
        CacheAside, Config, FallbackChain, GatewayError, MemoryStore, PayloadSource,
        RecipeAssistant,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NORMALIZED: &str = r#"{"query": "vegan pasta", "keywords": ["pasta"], "diet": "vegan"}"#;

    fn assistant(config: &Config, keys: &[(&str, &str)]) -> RecipeAssistant {
        assert_ok!(RecipeAssistant::with_store(
            config,
            Arc::new(MemoryStore::new()),
            lookup_from(keys),
        ))
    }

    async fn requests_to(server: &MockServer, route: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }

    fn recipe(title: &str, ingredients: &[&str]) -> RecipeSummary {
        RecipeSummary::new(title, ingredients.iter().map(|i| i.to_string()).collect())
    }

    // ==================== AI operations over HTTP ====================

    #[tokio::test]
    async fn test_equivalent_queries_hit_the_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(NORMALIZED)))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("GROQ_API_KEY", "gsk")]);

        let first = assert_ok!(assistant.normalize_query("Vegan pasta").await);
        let second = assert_ok!(assistant.normalize_query("  vegan   PASTA ").await);

        assert_eq!(first, second);
        assert_eq!(first.value.query, "vegan pasta");
        assert_eq!(
            first.source,
            PayloadSource::Provider {
                name: "groq".to_string(),
                tier: ExtractionTier::Direct,
            }
        );
        assert_eq!(requests_to(&server, GROQ_PATH).await, 1);

        let stats = assistant.cache_stats();
        assert_eq!((stats.hits, stats.misses, stats.writes), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_degraded_answers_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("GROQ_API_KEY", "gsk")]);

        let first = assert_ok!(assistant.normalize_query("quick chicken curry").await);
        let second = assert_ok!(assistant.normalize_query("quick chicken curry").await);

        assert!(first.is_degraded());
        assert!(second.is_degraded());
        assert!(!first.value.query.is_empty());
        assert_eq!(requests_to(&server, GROQ_PATH).await, 2);
        assert_eq!(assistant.cache_stats().writes, 0);
    }

    #[tokio::test]
    async fn test_degraded_answers_cached_when_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = mock_config(&server.uri());
        config.cache.cache_degraded = true;
        let assistant = assistant(&config, &[("GROQ_API_KEY", "gsk")]);

        assert_ok!(assistant.normalize_query("quick chicken curry").await);
        let cached = assert_ok!(assistant.normalize_query("quick chicken curry").await);

        assert!(cached.is_degraded());
        assert_eq!(requests_to(&server, GROQ_PATH).await, 1);
    }

    #[tokio::test]
    async fn test_no_provider_keys_is_a_configuration_error() {
        let server = MockServer::start().await;
        let assistant = assistant(&mock_config(&server.uri()), &[]);

        assert!(assistant.configured_providers().is_empty());
        let err = assert_err!(assistant.normalize_query("soup").await);
        assert!(matches!(
            err,
            GatewayError::Fallback(FallbackError::NoProvidersConfigured { .. })
        ));
        assert!(err.is_configuration_error());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_recommendation_key_ignores_preference_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
                r#"{"theme": "cozy", "dishes": [{"name": "Spicy lentil soup", "reason": "warming"}]}"#,
            )))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("GEMINI_API_KEY", "AIza")]);
        assert_eq!(assistant.configured_providers(), ["gemini"]);

        let mut context = RecommendationContext {
            temperature_c: Some(8.04),
            condition: Some("Rain".to_string()),
            meal: Some("dinner".to_string()),
            preferences: vec!["Vegan".to_string(), "spicy".to_string()],
        };
        let first = assert_ok!(assistant.recommend(&context).await);

        context.preferences = vec!["spicy".to_string(), " vegan".to_string()];
        context.temperature_c = Some(8.0);
        context.condition = Some("rain".to_string());
        let second = assert_ok!(assistant.recommend(&context).await);

        assert_eq!(first, second);
        assert_eq!(first.value.dishes[0].name, "Spicy lentil soup");
        assert_eq!(requests_to(&server, GEMINI_PATH).await, 1);
    }

    #[tokio::test]
    async fn test_nutrition_key_ignores_ingredient_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(
                r#"{"calories_per_serving": 520, "protein_g": 32, "carbs_g": 48, "fat_g": 20, "health_score": 6}"#,
            )))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("GROQ_API_KEY", "gsk")]);

        let a = recipe("Chicken Rice Bowl", &["chicken thigh", "jasmine rice", "broccoli"]);
        let b = recipe("chicken rice bowl", &["Broccoli", "jasmine rice", "chicken  thigh"]);

        let first = assert_ok!(assistant.analyze_nutrition(&a).await);
        let second = assert_ok!(assistant.analyze_nutrition(&b).await);

        assert_eq!(first.value.health_score, 6);
        assert_eq!(first, second);
        assert_eq!(requests_to(&server, GROQ_PATH).await, 1);

        // Servings are part of the identity
        assert_ok!(assistant.analyze_nutrition(&a.clone().with_servings(2)).await);
        assert_eq!(requests_to(&server, GROQ_PATH).await, 2);
    }

    #[tokio::test]
    async fn test_dietary_conversion_is_keyed_by_diet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply(
                r#"{"title": "Vegan Alfredo", "diet": "vegan", "substitutions": [{"original": "butter", "replacement": "olive oil"}]}"#,
            )))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("ANTHROPIC_API_KEY", "sk-ant")]);
        let alfredo = recipe("Alfredo", &["fettuccine", "butter", "parmesan"]);

        let vegan = assert_ok!(assistant.convert_diet(&alfredo, Diet::Vegan).await);
        assert_ok!(assistant.convert_diet(&alfredo, Diet::Vegan).await);
        assert_eq!(vegan.value.substitutions[0].replacement, "olive oil");
        assert_eq!(requests_to(&server, ANTHROPIC_PATH).await, 1);

        // The only provider answers for the wrong diet, so keto degrades
        let keto = assert_ok!(assistant.convert_diet(&alfredo, Diet::Keto).await);
        assert!(keto.is_degraded());
        assert_eq!(keto.value.diet, Diet::Keto);
        assert_eq!(requests_to(&server, ANTHROPIC_PATH).await, 2);
    }

    #[tokio::test]
    async fn test_invalid_inputs_are_rejected_before_any_call() {
        let server = MockServer::start().await;
        let assistant = assistant(&mock_config(&server.uri()), &[("GROQ_API_KEY", "gsk")]);

        assert!(matches!(
            assistant.normalize_query("   ").await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            assistant.analyze_nutrition(&recipe("Soup", &[" "])).await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            assistant.convert_diet(&recipe("", &["leek"]), Diet::Vegan).await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            assistant.search("", 1).await,
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    // ==================== Recipe search ====================

    #[tokio::test]
    async fn test_search_pages_are_cached_and_invalidated_together() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_results(&["Penne"])))
            .mount(&server)
            .await;

        let assistant = assistant(
            &mock_config(&server.uri()),
            &[("SPOONACULAR_API_KEY", "spoon-key-1")],
        );

        let page_one = assert_ok!(assistant.search("pasta", 1).await);
        assert_eq!(assert_ok!(assistant.search("pasta", 1).await), page_one);
        assert_ok!(assistant.search("pasta", 2).await);
        assert_ok!(assistant.search("pasta bake", 1).await);
        assert_eq!(requests_to(&server, SEARCH_PATH).await, 3);

        assert_eq!(assert_ok!(assistant.invalidate_search("pasta").await), 2);

        assert_ok!(assistant.search("pasta bake", 1).await);
        assert_eq!(requests_to(&server, SEARCH_PATH).await, 3);
        assert_ok!(assistant.search("pasta", 1).await);
        assert_eq!(requests_to(&server, SEARCH_PATH).await, 4);

        let stats = assistant.credential_stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].used, 4);
        assert!(!stats[0].credential.contains("spoon-key-1"));
    }

    #[tokio::test]
    async fn test_search_failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_results(&["Gnocchi"])))
            .mount(&server)
            .await;

        let assistant = assistant(&mock_config(&server.uri()), &[("SPOONACULAR_API_KEY", "k")]);

        let err = assert_err!(assistant.search("gnocchi", 1).await);
        assert!(matches!(err, GatewayError::Provider(_)));

        let body = assert_ok!(assistant.search("gnocchi", 1).await);
        assert_eq!(body["results"][0]["title"], "Gnocchi");
    }

    #[tokio::test]
    async fn test_search_without_keys_is_a_configuration_error() {
        let server = MockServer::start().await;
        let assistant = assistant(&mock_config(&server.uri()), &[]);

        let err = assert_err!(assistant.search("pasta", 1).await);
        assert!(matches!(err, GatewayError::NoCredentials(_)));
        assert!(err.is_configuration_error());
    }

    // ==================== TTL families ====================

    fn scripted_assistant(provider: Arc<ScriptedProvider>) -> RecipeAssistant {
        let chain = FallbackChain::new(
            vec![provider as Arc<dyn CompletionProvider>],
            &FallbackConfig::default(),
        );
        let search = RecipeSearchClient::new(
            SearchConfig::default(),
            HttpClient::new(Duration::from_secs(1)).unwrap(),
            Arc::new(CredentialRotator::new(
                "recipe_search",
                CredentialPool::from_values(Vec::<String>::new()),
                150,
            )),
        );
        RecipeAssistant::new(
            CacheAside::new(Arc::new(MemoryStore::new())),
            chain,
            search,
            CacheConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_results_use_the_short_ttl() {
        let provider = ScriptedProvider::replying("scripted", NORMALIZED);
        let assistant = scripted_assistant(provider.clone());

        assert_ok!(assistant.normalize_query("vegan pasta").await);
        tokio::time::advance(Duration::from_secs(29 * 60)).await;
        assert_ok!(assistant.normalize_query("vegan pasta").await);
        assert_eq!(provider.calls(), 1);

        tokio::time::advance(Duration::from_secs(2 * 60)).await;
        assert_ok!(assistant.normalize_query("vegan pasta").await);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_derived_results_use_the_long_ttl() {
        let provider = ScriptedProvider::new(
            "scripted",
            vec![Script::reply(
                r#"{"calories_per_serving": 300, "protein_g": 10, "carbs_g": 40, "fat_g": 9, "health_score": 8}"#,
            )],
        );
        let assistant = scripted_assistant(provider.clone());
        let salad = recipe("Greek Salad", &["cucumber", "tomato", "feta"]);

        assert_ok!(assistant.analyze_nutrition(&salad).await);
        tokio::time::advance(Duration::from_secs(23 * 3600)).await;
        assert_ok!(assistant.analyze_nutrition(&salad).await);
        assert_eq!(provider.calls(), 1);

        tokio::time::advance(Duration::from_secs(2 * 3600)).await;
        assert_ok!(assistant.analyze_nutrition(&salad).await);
        assert_eq!(provider.calls(), 2);
    }
}
