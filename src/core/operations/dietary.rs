//! Dietary conversion of a recipe

use super::RecipeSummary;
use crate::core::fallback::StructuredOperation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diet {
    Vegetarian,
    Vegan,
    GlutenFree,
    DairyFree,
    Keto,
}

impl Diet {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::Vegan => "Vegan",
            Self::GlutenFree => "Gluten-Free",
            Self::DairyFree => "Dairy-Free",
            Self::Keto => "Keto",
        }
    }

    /// Keyword/replacement pairs, most specific keyword first
    fn substitutions(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Vegetarian => MEAT_FREE,
            Self::Vegan => VEGAN,
            Self::GlutenFree => GLUTEN_FREE,
            Self::DairyFree => DAIRY_FREE,
            Self::Keto => KETO,
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Diet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "vegetarian" => Ok(Self::Vegetarian),
            "vegan" => Ok(Self::Vegan),
            "glutenfree" => Ok(Self::GlutenFree),
            "dairyfree" => Ok(Self::DairyFree),
            "keto" | "ketogenic" => Ok(Self::Keto),
            _ => Err(format!("Unknown diet: {}", s.trim())),
        }
    }
}

const MEAT_FREE: &[(&str, &str)] = &[
    ("chicken stock", "vegetable stock"),
    ("chicken broth", "vegetable broth"),
    ("beef stock", "mushroom stock"),
    ("fish sauce", "soy sauce with a pinch of seaweed"),
    ("chicken", "extra-firm tofu"),
    ("beef", "lentils or mushrooms"),
    ("bacon", "smoked tempeh"),
    ("pork", "smoked tempeh"),
    ("lamb", "jackfruit"),
    ("sausage", "vegetarian sausage"),
    ("shrimp", "king oyster mushrooms"),
    ("prawn", "king oyster mushrooms"),
    ("salmon", "marinated tofu"),
    ("tuna", "mashed chickpeas"),
    ("fish", "marinated tofu"),
    ("anchov", "capers"),
    ("gelatin", "agar agar"),
];

const VEGAN: &[(&str, &str)] = &[
    ("chicken stock", "vegetable stock"),
    ("chicken broth", "vegetable broth"),
    ("beef stock", "mushroom stock"),
    ("fish sauce", "soy sauce with a pinch of seaweed"),
    ("chicken", "extra-firm tofu"),
    ("beef", "lentils or mushrooms"),
    ("bacon", "smoked tempeh"),
    ("pork", "smoked tempeh"),
    ("lamb", "jackfruit"),
    ("sausage", "plant-based sausage"),
    ("shrimp", "king oyster mushrooms"),
    ("prawn", "king oyster mushrooms"),
    ("salmon", "marinated tofu"),
    ("tuna", "mashed chickpeas"),
    ("fish", "marinated tofu"),
    ("anchov", "capers"),
    ("gelatin", "agar agar"),
    ("buttermilk", "oat milk with lemon juice"),
    ("butter", "plant-based butter"),
    ("milk", "oat milk"),
    ("cream cheese", "cashew cream cheese"),
    ("cheese", "nutritional yeast or vegan cheese"),
    ("parmesan", "nutritional yeast"),
    ("cream", "coconut cream"),
    ("yogurt", "coconut yogurt"),
    ("egg", "flax egg (1 tbsp ground flax + 3 tbsp water)"),
    ("honey", "maple syrup"),
];

const GLUTEN_FREE: &[(&str, &str)] = &[
    ("soy sauce", "tamari"),
    ("breadcrumb", "gluten-free breadcrumbs"),
    ("bread", "gluten-free bread"),
    ("flour", "gluten-free flour blend"),
    ("spaghetti", "rice or chickpea spaghetti"),
    ("pasta", "rice or chickpea pasta"),
    ("noodle", "rice noodles"),
    ("couscous", "quinoa"),
    ("barley", "brown rice"),
    ("tortilla", "corn tortillas"),
    ("beer", "gluten-free beer"),
];

const DAIRY_FREE: &[(&str, &str)] = &[
    ("buttermilk", "oat milk with lemon juice"),
    ("butter", "olive oil or dairy-free butter"),
    ("milk", "oat milk"),
    ("cream cheese", "cashew cream cheese"),
    ("cheese", "dairy-free cheese"),
    ("parmesan", "nutritional yeast"),
    ("cream", "coconut cream"),
    ("yogurt", "coconut yogurt"),
];

const KETO: &[(&str, &str)] = &[
    ("sugar", "erythritol or monk fruit sweetener"),
    ("honey", "sugar-free syrup"),
    ("rice", "cauliflower rice"),
    ("spaghetti", "zucchini noodles"),
    ("pasta", "zucchini noodles"),
    ("noodle", "shirataki noodles"),
    ("potato", "cauliflower"),
    ("flour", "almond flour"),
    ("bread", "lettuce wraps or keto bread"),
    ("tortilla", "low-carb tortillas"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryRequest {
    pub recipe: RecipeSummary,
    pub diet: Diet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub original: String,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietaryConversion {
    pub title: String,
    pub diet: Diet,
    pub substitutions: Vec<Substitution>,
    #[serde(default)]
    pub notes: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You adapt recipes to dietary requirements. Respond with a single \
JSON object and nothing else:
{\"title\": \"adapted recipe title\", \"diet\": \"vegetarian|vegan|gluten_free|dairy_free|keto\", \
\"substitutions\": [{\"original\": \"ingredient\", \"replacement\": \"ingredient\"}], \
\"notes\": [\"short cooking note\"]}
Only list ingredients that actually need replacing.";

pub const RULE_BASED_NOTE: &str = "Rule-based substitutions; check quantities and cooking times";

#[derive(Debug, Default, Clone, Copy)]
pub struct DietaryConverter;

impl StructuredOperation for DietaryConverter {
    type Input = DietaryRequest;
    type Output = DietaryConversion;

    const NAME: &'static str = "convert_diet";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, input: &DietaryRequest) -> String {
        format!(
            "Target diet: {}\n{}",
            serde_json::to_value(input.diet)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| input.diet.label().to_string()),
            input.recipe.describe()
        )
    }

    fn accept(&self, input: &DietaryRequest, output: &DietaryConversion) -> bool {
        output.diet == input.diet
            && !output.title.trim().is_empty()
            && output
                .substitutions
                .iter()
                .all(|s| !s.original.trim().is_empty() && !s.replacement.trim().is_empty())
    }

    /// Static substitution table for the requested diet
    fn fallback(&self, input: &DietaryRequest) -> DietaryConversion {
        let table = input.diet.substitutions();
        let substitutions = input
            .recipe
            .ingredients
            .iter()
            .filter_map(|ingredient| {
                let lowered = ingredient.to_lowercase();
                table
                    .iter()
                    .find(|(keyword, _)| lowered.contains(keyword))
                    .map(|(_, replacement)| Substitution {
                        original: ingredient.trim().to_string(),
                        replacement: replacement.to_string(),
                    })
            })
            .collect();

        DietaryConversion {
            title: format!("{} {}", input.diet.label(), input.recipe.title.trim()),
            diet: input.diet,
            substitutions,
            notes: vec![RULE_BASED_NOTE.to_string()],
        }
    }
}
