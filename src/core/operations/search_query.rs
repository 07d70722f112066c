//! Free-text search normalisation

use super::text::{keywords, normalize};
use crate::core::fallback::StructuredOperation;
use serde::{Deserialize, Serialize};

/// Search parameters derived from what the user typed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuery {
    /// Concise query suitable for the recipe search upstream
    pub query: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ready_minutes: Option<u32>,
}

const SYSTEM_PROMPT: &str = "You turn a home cook's free-text request into recipe search \
parameters. Respond with a single JSON object and nothing else:
{\"query\": \"short search phrase\", \"keywords\": [\"ingredient or dish words\"], \
\"cuisine\": \"cuisine or null\", \"diet\": \"diet or null\", \
\"max_ready_minutes\": number or null}
Keep the query under six words. Do not invent constraints the user did not state.";

#[derive(Debug, Default, Clone, Copy)]
pub struct SearchQueryNormalizer;

impl StructuredOperation for SearchQueryNormalizer {
    type Input = str;
    type Output = NormalizedQuery;

    const NAME: &'static str = "normalize_query";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, input: &str) -> String {
        format!("Request: {}", input.trim())
    }

    fn accept(&self, _input: &str, output: &NormalizedQuery) -> bool {
        !output.query.trim().is_empty() && output.max_ready_minutes != Some(0)
    }

    /// Echo of the user's own terms
    fn fallback(&self, input: &str) -> NormalizedQuery {
        let keywords = keywords(input);
        let query = if keywords.is_empty() {
            normalize(input)
        } else {
            keywords.join(" ")
        };

        NormalizedQuery {
            query,
            keywords,
            cuisine: None,
            diet: None,
            max_ready_minutes: None,
        }
    }
}
