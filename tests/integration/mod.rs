//! Integration tests for recipe-gateway
//!
//! Components are wired together for real; upstream HTTP services are
//! `wiremock` servers on localhost.

pub mod assistant_tests;
pub mod credentials_tests;
pub mod fallback_tests;
pub mod provider_http_tests;
