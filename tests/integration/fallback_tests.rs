//! Fallback chain over scripted and HTTP-backed providers

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        ANTHROPIC_PATH, GEMINI_PATH, GROQ_PATH, anthropic_reply, gemini_reply, lookup_from,
        mock_config, openai_reply,
    };
    use crate::common::{Script, ScriptedProvider};
    use crate::{assert_err, assert_ok};
    use recipe_gateway::config::FallbackConfig;
    use recipe_gateway::core::extraction::ExtractionTier;
    use recipe_gateway::core::fallback::{
        AttemptOutcome, FallbackChain, FallbackError, PayloadSource, StructuredOperation,
    };
    use recipe_gateway::core::operations::{
        Diet, DietaryConverter, DietaryRequest, NutritionAnalyzer, RecipeSummary,
        SearchQueryNormalizer,
    };
    use recipe_gateway::core::providers::{
        CompletionProvider, HttpClient, ProviderError, build_providers,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chain(scripted: Vec<Arc<ScriptedProvider>>) -> FallbackChain {
        let providers = scripted
            .into_iter()
            .map(|p| p as Arc<dyn CompletionProvider>)
            .collect();
        FallbackChain::new(
            providers,
            &FallbackConfig {
                attempt_timeout_ms: 1_000,
                overall_timeout_ms: 5_000,
            },
        )
    }

    fn pasta() -> RecipeSummary {
        RecipeSummary::new(
            "Chicken Alfredo",
            vec![
                "fettuccine".to_string(),
                "chicken breast".to_string(),
                "butter".to_string(),
                "parmesan cheese".to_string(),
            ],
        )
        .with_servings(4)
    }

    // ==================== Scripted providers ====================

    #[tokio::test(start_paused = true)]
    async fn test_first_acceptable_payload_wins() {
        let first = ScriptedProvider::new("first", vec![Script::Hang]);
        let second = ScriptedProvider::replying("second", "Sure! Here you go: {\"query\": \"ramen\"} enjoy");
        let third = ScriptedProvider::replying("third", "{\"query\": \"never asked\"}");

        let chain = chain(vec![first.clone(), second.clone(), third.clone()]);
        let completion = assert_ok!(chain.run(&SearchQueryNormalizer, "ramen please").await);

        assert_eq!(completion.value.query, "ramen");
        assert_eq!(
            completion.source,
            PayloadSource::Provider {
                name: "second".to_string(),
                tier: ExtractionTier::Delimited,
            }
        );
        assert_eq!(completion.attempts.len(), 2);
        assert_eq!(completion.attempts[0].outcome, AttemptOutcome::TimedOut);
        assert_eq!(completion.attempts[0].elapsed, Duration::from_secs(1));
        assert_eq!(third.calls(), 0);
        assert!(second.requests()[0].user.contains("ramen please"));
    }

    #[tokio::test]
    async fn test_accept_check_uses_operation_input() {
        // A vegan conversion handed back for a keto request is rejected
        let wrong = ScriptedProvider::replying(
            "wrong",
            r#"{"title": "Vegan Alfredo", "diet": "vegan", "substitutions": [], "notes": []}"#,
        );
        let right = ScriptedProvider::replying(
            "right",
            "```json\n{\"title\": \"Keto Alfredo\", \"diet\": \"keto\", \"substitutions\": [{\"original\": \"fettuccine\", \"replacement\": \"zucchini noodles\"}], \"notes\": []}\n```",
        );
        let chain = chain(vec![wrong.clone(), right.clone()]);
        let request = DietaryRequest {
            recipe: pasta(),
            diet: Diet::Keto,
        };

        let completion = assert_ok!(chain.run(&DietaryConverter, &request).await);

        assert_eq!(completion.value.diet, Diet::Keto);
        assert!(matches!(
            completion.attempts[0].outcome,
            AttemptOutcome::Rejected { .. }
        ));
        assert_eq!(
            completion.source,
            PayloadSource::Provider {
                name: "right".to_string(),
                tier: ExtractionTier::Fenced,
            }
        );
    }

    #[tokio::test]
    async fn test_total_failure_degrades_to_rule_based() {
        let down = ScriptedProvider::new(
            "down",
            vec![Script::Fail(ProviderError::api_error("down", 503, "unavailable"))],
        );
        let chatty = ScriptedProvider::replying("chatty", "I cannot estimate nutrition, sorry.");
        let chain = chain(vec![down, ScriptedProvider::unconfigured("nokey"), chatty]);

        let completion = assert_ok!(chain.run(&NutritionAnalyzer, &pasta()).await);

        assert!(completion.is_degraded());
        assert_eq!(completion.value, NutritionAnalyzer.fallback(&pasta()));
        let outcomes: Vec<_> = completion.attempts.iter().map(|a| &a.outcome).collect();
        assert!(matches!(
            outcomes[0],
            AttemptOutcome::Failed {
                status: Some(503),
                ..
            }
        ));
        assert_eq!(outcomes[1], &AttemptOutcome::Skipped);
        assert!(matches!(outcomes[2], AttemptOutcome::Unparseable { .. }));
    }

    #[tokio::test]
    async fn test_no_configured_provider_is_an_error() {
        let chain = chain(vec![
            ScriptedProvider::unconfigured("a"),
            ScriptedProvider::unconfigured("b"),
        ]);

        let err = assert_err!(chain.run(&SearchQueryNormalizer, "soup").await);
        assert_eq!(
            err,
            FallbackError::NoProvidersConfigured {
                operation: "normalize_query".to_string()
            }
        );
    }

    // ==================== HTTP providers ====================

    #[tokio::test]
    async fn test_http_chain_walks_past_quota_and_garbage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(402).set_body_string("credits exhausted"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("no json here")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(anthropic_reply("{\"query\": \"thai curry\", \"cuisine\": \"thai\"}")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = mock_config(&server.uri());
        let http = HttpClient::new(config.fallback.attempt_timeout()).unwrap();
        let providers = build_providers(
            &config.providers,
            &http,
            lookup_from(&[
                ("GROQ_API_KEY", "gsk"),
                ("GEMINI_API_KEY", "AIza"),
                ("ANTHROPIC_API_KEY", "sk-ant"),
            ]),
        );
        let chain = FallbackChain::new(providers, &config.fallback);

        let completion = assert_ok!(chain.run(&SearchQueryNormalizer, "thai curry").await);

        assert_eq!(completion.value.cuisine.as_deref(), Some("thai"));
        assert_eq!(
            completion.source,
            PayloadSource::Provider {
                name: "anthropic".to_string(),
                tier: ExtractionTier::Direct,
            }
        );
        assert!(matches!(
            completion.attempts[0].outcome,
            AttemptOutcome::Failed {
                status: Some(402),
                ..
            }
        ));
        assert_eq!(
            completion.attempts[1].raw_response.as_deref(),
            Some("no json here")
        );
    }

    #[tokio::test]
    async fn test_http_chain_slow_provider_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(openai_reply("{\"query\": \"late\"}"))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("{\"query\": \"on time\"}")))
            .mount(&server)
            .await;

        let mut config = mock_config(&server.uri());
        config.fallback.attempt_timeout_ms = 300;
        let http = HttpClient::new(Duration::from_secs(30)).unwrap();
        let providers = build_providers(
            &config.providers,
            &http,
            lookup_from(&[("GROQ_API_KEY", "gsk"), ("GEMINI_API_KEY", "AIza")]),
        );
        let chain = FallbackChain::new(providers, &config.fallback);

        let completion = assert_ok!(chain.run(&SearchQueryNormalizer, "anything").await);

        assert_eq!(completion.value.query, "on time");
        assert_eq!(completion.attempts[0].outcome, AttemptOutcome::TimedOut);
        assert!(completion.attempts[0].elapsed < Duration::from_secs(2));
        assert_eq!(completion.attempts.len(), 2);
    }
}
