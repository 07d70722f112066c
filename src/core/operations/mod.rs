//! The AI-derived operations served through the fallback chain
//!
//! Each operation owns its prompts, the structural check applied to
//! provider payloads, and a deterministic rule-based answer.

pub mod dietary;
pub mod nutrition;
pub mod recommendation;
pub mod search_query;
pub mod text;

pub use dietary::{Diet, DietaryConversion, DietaryConverter, DietaryRequest, Substitution};
pub use nutrition::{NutritionAnalysis, NutritionAnalyzer};
pub use recommendation::{
    DishSuggestion, RecommendationContext, RecommendationGenerator, Recommendations,
};
pub use search_query::{NormalizedQuery, SearchQueryNormalizer};

use serde::{Deserialize, Serialize};

/// The parts of a recipe the analysis operations need
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub title: String,
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
}

impl RecipeSummary {
    pub fn new(title: impl Into<String>, ingredients: Vec<String>) -> Self {
        Self {
            title: title.into(),
            ingredients,
            servings: None,
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }

    /// Prompt-ready rendering
    pub(crate) fn describe(&self) -> String {
        let mut out = format!("Recipe: {}\n", self.title.trim());
        if let Some(servings) = self.servings {
            out.push_str(&format!("Servings: {}\n", servings));
        }
        out.push_str("Ingredients:\n");
        for ingredient in &self.ingredients {
            out.push_str(&format!("- {}\n", ingredient.trim()));
        }
        out
    }
}
