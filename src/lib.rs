//! # recipe-gateway
//!
//! Resilient upstream orchestration for a recipe application.
//!
//! Three building blocks sit between request handlers and the outside world:
//!
//! - **Cache-aside**: memoize expensive upstream results in Redis (or an
//!   in-process store) with per-family TTLs. Failures are never cached and a
//!   broken store only costs latency.
//! - **Credential rotation**: spread calls to a metered API across a pool of
//!   keys, each with its own quota, and fail over on quota rejections.
//! - **Provider fallback**: ask a ranked list of LLM providers for structured
//!   JSON, recover it from messy output, and degrade to a rule-based answer
//!   when every provider fails.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recipe_gateway::{Config, RecipeAssistant};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None).await?;
//!     let assistant = RecipeAssistant::from_config(&config).await?;
//!
//!     let answer = assistant.normalize_query("quick vegan pasta under 30 minutes").await?;
//!     println!("{} (degraded: {})", answer.value.query, answer.is_degraded());
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result};

pub use core::assistant::{Answer, RecipeAssistant};
pub use core::cache::{CacheAside, CacheKey, CacheStats};
pub use core::credentials::{CredentialPool, CredentialRotator, CredentialStats};
pub use core::extraction::{ExtractionTier, extract_structured};
pub use core::fallback::{
    AttemptOutcome, AttemptRecord, Completion, FallbackChain, FallbackError, PayloadSource,
    StructuredOperation,
};
pub use core::providers::{CompletionProvider, CompletionRequest, ProviderError};
pub use storage::{CacheStore, MemoryStore};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
