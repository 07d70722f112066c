//! Weather-aware meal recommendations

use super::text::mentions_any;
use crate::core::fallback::StructuredOperation;
use serde::{Deserialize, Serialize};

/// Below this temperature the rule-based fallback suggests hearty food
pub const HEARTY_BELOW_C: f64 = 12.0;
/// From this temperature on it suggests light, cold dishes
pub const LIGHT_FROM_C: f64 = 24.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    /// e.g. "rain", "clear"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// e.g. "dinner"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<String>,
    #[serde(default)]
    pub preferences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishSuggestion {
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub theme: String,
    pub dishes: Vec<DishSuggestion>,
}

const SYSTEM_PROMPT: &str = "You suggest what to cook given the weather and the cook's \
preferences. Respond with a single JSON object and nothing else:
{\"theme\": \"one or two words\", \"dishes\": [{\"name\": \"dish\", \"reason\": \"one sentence\"}]}
Suggest between three and five dishes.";

const MAX_DISHES: usize = 8;

#[derive(Debug, Default, Clone, Copy)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    fn theme_for(temperature_c: Option<f64>) -> &'static str {
        match temperature_c {
            Some(t) if t < HEARTY_BELOW_C => "hearty",
            Some(t) if t >= LIGHT_FROM_C => "light",
            _ => "balanced",
        }
    }

    fn dishes_for(theme: &str, vegetarian: bool) -> &'static [(&'static str, &'static str)] {
        match (theme, vegetarian) {
            ("hearty", false) => &[
                ("Beef stew", "Slow-cooked and warming on a cold day"),
                ("Chicken pot pie", "Rich comfort food for chilly weather"),
                ("Minestrone soup", "A filling bowl that keeps you warm"),
            ],
            ("hearty", true) => &[
                ("Lentil stew", "Slow-cooked and warming on a cold day"),
                ("Mushroom risotto", "Creamy comfort food for chilly weather"),
                ("Minestrone soup", "A filling bowl that keeps you warm"),
            ],
            ("light", false) => &[
                ("Greek salad", "Fresh and cooling in the heat"),
                ("Chilled gazpacho", "No cooking needed on a hot day"),
                ("Tuna poke bowl", "Light protein without a hot stove"),
            ],
            ("light", true) => &[
                ("Greek salad", "Fresh and cooling in the heat"),
                ("Chilled gazpacho", "No cooking needed on a hot day"),
                ("Cold soba noodle salad", "Light and quick without a hot stove"),
            ],
            (_, false) => &[
                ("Grilled chicken with roasted vegetables", "Balanced and easy for mild weather"),
                ("Salmon with quinoa", "Wholesome without being heavy"),
                ("Vegetable stir-fry", "Quick and adaptable to what you have"),
            ],
            (_, true) => &[
                ("Halloumi and roasted vegetable tray bake", "Balanced and easy for mild weather"),
                ("Chickpea quinoa bowl", "Wholesome without being heavy"),
                ("Vegetable stir-fry", "Quick and adaptable to what you have"),
            ],
        }
    }
}

impl StructuredOperation for RecommendationGenerator {
    type Input = RecommendationContext;
    type Output = Recommendations;

    const NAME: &'static str = "recommend";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, input: &RecommendationContext) -> String {
        let mut lines = Vec::new();
        match input.temperature_c {
            Some(t) => lines.push(format!("Temperature: {:.1} C", t)),
            None => lines.push("Temperature: unknown".to_string()),
        }
        if let Some(condition) = &input.condition {
            lines.push(format!("Conditions: {}", condition));
        }
        if let Some(meal) = &input.meal {
            lines.push(format!("Meal: {}", meal));
        }
        if !input.preferences.is_empty() {
            lines.push(format!("Preferences: {}", input.preferences.join(", ")));
        }
        lines.join("\n")
    }

    fn accept(&self, _input: &RecommendationContext, output: &Recommendations) -> bool {
        !output.theme.trim().is_empty()
            && !output.dishes.is_empty()
            && output.dishes.len() <= MAX_DISHES
            && output.dishes.iter().all(|d| !d.name.trim().is_empty())
    }

    /// Temperature-threshold heuristic
    fn fallback(&self, input: &RecommendationContext) -> Recommendations {
        let theme = Self::theme_for(input.temperature_c);
        let vegetarian = input
            .preferences
            .iter()
            .any(|p| mentions_any(p, &["vegetarian", "vegan", "meatless"]));

        Recommendations {
            theme: theme.to_string(),
            dishes: Self::dishes_for(theme, vegetarian)
                .iter()
                .map(|(name, reason)| DishSuggestion {
                    name: name.to_string(),
                    reason: reason.to_string(),
                })
                .collect(),
        }
    }
}
