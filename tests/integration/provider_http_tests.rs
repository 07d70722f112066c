//! Provider adapters against a mock HTTP server
//!
//! Each adapter makes exactly one call per `complete` and maps upstream
//! failures onto `ProviderError`.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        ANTHROPIC_PATH, GEMINI_PATH, GROQ_PATH, anthropic_reply, gemini_reply, lookup_from,
        mock_providers, openai_reply,
    };
    use crate::{assert_err, assert_ok};
    use recipe_gateway::core::providers::{
        CompletionProvider, CompletionRequest, HttpClient, ProviderError, ProviderKeys,
        build_provider,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_millis(500)).unwrap()
    }

    /// Adapter number `index` of the mock chain with a single key
    fn adapter(server: &MockServer, index: usize, key: &str) -> Arc<dyn CompletionProvider> {
        let settings = &mock_providers(&server.uri())[index];
        build_provider(settings, http(), ProviderKeys::single(&settings.name, key))
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new("Reply with JSON.", "Request: pasta")
    }

    // ==================== Request and response shapes ====================

    #[tokio::test]
    async fn test_openai_compatible_sends_bearer_and_chat_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [
                    { "role": "system", "content": "Reply with JSON." },
                    { "role": "user", "content": "Request: pasta" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{\"query\":\"pasta\"}")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = adapter(&server, 0, "gsk-test");
        let text = assert_ok!(provider.complete(&request()).await);
        assert_eq!(text, "{\"query\":\"pasta\"}");
    }

    #[tokio::test]
    async fn test_openai_compatible_forwards_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .and(header("x-title", "recipe-gateway"))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{}")))
            .expect(1)
            .mount(&server)
            .await;

        let settings = mock_providers(&server.uri())[0]
            .clone()
            .with_header("X-Title", "recipe-gateway");
        let provider = build_provider(&settings, http(), ProviderKeys::single("groq", "k"));
        assert_ok!(provider.complete(&request()).await);
    }

    #[tokio::test]
    async fn test_gemini_uses_generate_content_and_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(json!({
                "systemInstruction": { "parts": [{ "text": "Reply with JSON." }] },
                "contents": [{ "role": "user", "parts": [{ "text": "Request: pasta" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("[1, 2]")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = adapter(&server, 1, "AIza-test");
        assert_eq!(assert_ok!(provider.complete(&request()).await), "[1, 2]");

        let received = server.received_requests().await.unwrap();
        assert!(received[0].url.query().is_none(), "key must not travel in the URL");
    }

    #[tokio::test]
    async fn test_anthropic_sends_version_and_top_level_system() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_PATH))
            .and(header("x-api-key", "sk-ant-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_partial_json(json!({
                "system": "Reply with JSON.",
                "messages": [{ "role": "user", "content": "Request: pasta" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("{\"ok\":true}")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = adapter(&server, 2, "sk-ant-test");
        assert_eq!(assert_ok!(provider.complete(&request()).await), "{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_empty_content_is_a_parsing_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server, 0, "k").complete(&request()).await);
        assert!(matches!(err, ProviderError::ResponseParsing { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_gemini_blocked_prompt_is_a_parsing_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
            )
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server, 1, "k").complete(&request()).await);
        assert!(matches!(err, ProviderError::ResponseParsing { .. }), "{:?}", err);
    }

    #[tokio::test]
    async fn test_non_json_body_is_a_parsing_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server, 2, "k").complete(&request()).await);
        assert!(matches!(err, ProviderError::ResponseParsing { .. }), "{:?}", err);
    }

    // ==================== Error mapping ====================

    #[tokio::test]
    async fn test_status_mapping() {
        let cases: [(u16, fn(&ProviderError) -> bool); 5] = [
            (401, |e| matches!(e, ProviderError::Authentication { .. })),
            (402, |e| matches!(e, ProviderError::QuotaExceeded { .. })),
            (408, |e| matches!(e, ProviderError::Timeout { .. })),
            (500, |e| matches!(e, ProviderError::ApiError { status: 500, .. })),
            (504, |e| matches!(e, ProviderError::Timeout { .. })),
        ];

        for (status, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path(GROQ_PATH))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let err = assert_err!(adapter(&server, 0, "k").complete(&request()).await);
            assert!(expected(&err), "status {} mapped to {:?}", status, err);
            assert_eq!(err.provider(), "groq");
        }
    }

    #[tokio::test]
    async fn test_rate_limit_carries_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server, 0, "k").complete(&request()).await);
        match err {
            ProviderError::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(7)),
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(openai_reply("{}"))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = assert_err!(adapter(&server, 0, "k").complete(&request()).await);
        assert!(err.is_timeout(), "{:?}", err);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_maps_to_network() {
        let settings = &mock_providers("http://127.0.0.1:1")[0];
        let provider = build_provider(settings, http(), ProviderKeys::single("groq", "k"));
        let err = assert_err!(provider.complete(&request()).await);
        assert!(
            matches!(err, ProviderError::Network { .. } | ProviderError::Timeout { .. }),
            "{:?}",
            err
        );
    }

    // ==================== Key bookkeeping ====================

    #[tokio::test]
    async fn test_quota_rejection_exhausts_key_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GROQ_PATH))
            .respond_with(ResponseTemplate::new(402).set_body_string("out of credits"))
            .expect(1)
            .mount(&server)
            .await;

        let mut settings = mock_providers(&server.uri())[0].clone();
        settings.rotate_keys = true;
        settings.daily_limit = 10;
        let keys = ProviderKeys::from_settings(
            &settings,
            lookup_from(&[("GROQ_API_KEY", "gsk-one-1234"), ("GROQ_API_KEY_2", "gsk-two-5678")]),
        );
        let rotator = keys.rotator().clone();
        let provider = build_provider(&settings, http(), keys);

        let err = assert_err!(provider.complete(&request()).await);
        assert!(err.is_quota_rejection());

        let stats = rotator.stats();
        assert!(stats[0].exhausted);
        assert_eq!(stats[0].used, 10);
        assert_eq!(stats[1].used, 0);
        assert_eq!(rotator.select_credential().as_deref(), Some("gsk-two-5678"));
    }

    #[tokio::test]
    async fn test_success_counts_against_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANTHROPIC_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(anthropic_reply("{}")))
            .mount(&server)
            .await;

        let settings = mock_providers(&server.uri())[2].clone();
        let keys = ProviderKeys::from_settings(
            &settings,
            lookup_from(&[("ANTHROPIC_API_KEY", "sk-ant-abcdef")]),
        );
        let rotator = keys.rotator().clone();
        let provider = build_provider(&settings, http(), keys);

        assert_ok!(provider.complete(&request()).await);
        assert_ok!(provider.complete(&request()).await);

        let stats = rotator.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].used, 2);
        assert!(stats[0].last_used.is_some());
        assert!(!stats[0].credential.contains("abcdef"));
    }

    #[tokio::test]
    async fn test_provider_without_key_is_unconfigured() {
        let server = MockServer::start().await;
        let settings = &mock_providers(&server.uri())[1];
        let keys = ProviderKeys::from_settings(settings, lookup_from(&[]));
        let provider = build_provider(settings, http(), keys);

        assert!(!provider.is_configured());
        let err = assert_err!(provider.complete(&request()).await);
        assert!(matches!(err, ProviderError::NotConfigured { .. }));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
