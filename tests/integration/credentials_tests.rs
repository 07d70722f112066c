//! Quota windows observed through a real upstream client

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{SEARCH_PATH, lookup_from, search_results};
    use crate::{assert_err, assert_ok};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use recipe_gateway::config::{CredentialConfig, QuotaWindow, SearchConfig};
    use recipe_gateway::core::credentials::{CredentialRotator, ManualClock};
    use recipe_gateway::core::providers::HttpClient;
    use recipe_gateway::core::search::RecipeSearchClient;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_client(
        server: &MockServer,
        window: QuotaWindow,
        clock: Arc<ManualClock>,
    ) -> RecipeSearchClient {
        let config = CredentialConfig {
            env_prefix: "RECIPE_KEY".to_string(),
            daily_limit: 2,
            window,
        };
        let rotator = CredentialRotator::from_config(
            "recipe_search",
            &config,
            lookup_from(&[("RECIPE_KEY", "day-key-1"), ("RECIPE_KEY_2", "day-key-2")]),
        )
        .with_clock(clock);

        RecipeSearchClient::new(
            SearchConfig {
                base_url: server.uri(),
                ..SearchConfig::default()
            },
            HttpClient::new(Duration::from_secs(1)).unwrap(),
            Arc::new(rotator),
        )
    }

    async fn mount_ok(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_results(&["Shakshuka"])))
            .mount(server)
            .await;
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_daily_window_restores_quota_at_midnight_utc() {
        let server = MockServer::start().await;
        mount_ok(&server).await;
        let clock = clock();
        let client = search_client(&server, QuotaWindow::Daily, clock.clone());

        for _ in 0..3 {
            assert_ok!(client.search("eggs", 1).await);
        }
        let stats = client.rotator().stats();
        assert_eq!((stats[0].used, stats[1].used), (2, 1));

        clock.advance(ChronoDuration::hours(3));
        assert_ok!(client.search("eggs", 1).await);

        let stats = client.rotator().stats();
        assert_eq!((stats[0].used, stats[1].used), (1, 0));
        assert_eq!(client.rotator().reset_count(), 0);
    }

    #[tokio::test]
    async fn test_lifetime_window_carries_usage_across_days() {
        let server = MockServer::start().await;
        mount_ok(&server).await;
        let clock = clock();
        let client = search_client(&server, QuotaWindow::Lifetime, clock.clone());

        for _ in 0..3 {
            assert_ok!(client.search("eggs", 1).await);
        }
        clock.advance(ChronoDuration::days(2));
        assert_ok!(client.search("eggs", 1).await);

        let stats = client.rotator().stats();
        assert_eq!((stats[0].used, stats[1].used), (2, 2));
        assert!(stats.iter().all(|s| s.exhausted));
    }

    #[tokio::test]
    async fn test_rejected_key_returns_the_next_day() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(402))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        mount_ok(&server).await;

        let clock = clock();
        let client = search_client(&server, QuotaWindow::Daily, clock.clone());

        let err = assert_err!(client.search("eggs", 1).await);
        assert!(err.is_quota_rejection());
        assert!(!client.rotator().has_available());

        clock.advance(ChronoDuration::days(1));
        assert!(client.rotator().has_available());
        assert_ok!(client.search("eggs", 1).await);
        assert_eq!(client.rotator().stats()[0].used, 1);
    }
}
