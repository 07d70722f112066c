//! Nutrition and health analysis of a recipe

use super::RecipeSummary;
use crate::core::fallback::StructuredOperation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionAnalysis {
    pub calories_per_serving: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    /// 1 (least healthy) to 10
    pub health_score: u8,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

const SYSTEM_PROMPT: &str = "You are a nutritionist estimating per-serving nutrition for a \
recipe. Respond with a single JSON object and nothing else:
{\"calories_per_serving\": number, \"protein_g\": number, \"carbs_g\": number, \
\"fat_g\": number, \"health_score\": integer 1-10, \"highlights\": [\"short phrase\"], \
\"warnings\": [\"short phrase\"]}";

pub const ESTIMATE_WARNING: &str = "Estimated from ingredient keywords; detailed analysis unavailable";

const DEFAULT_SERVINGS: u32 = 4;

/// Rough whole-recipe contribution of a typical quantity: kcal, protein, carbs, fat
struct Profile {
    keywords: &'static [&'static str],
    kcal: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    indulgent: bool,
}

#[rustfmt::skip]
const PROFILES: &[Profile] = &[
    Profile { keywords: &["chicken", "turkey"], kcal: 250.0, protein: 45.0, carbs: 0.0, fat: 6.0, indulgent: false },
    Profile { keywords: &["beef", "lamb", "pork", "sausage", "bacon"], kcal: 350.0, protein: 38.0, carbs: 0.0, fat: 22.0, indulgent: false },
    Profile { keywords: &["salmon", "tuna", "cod", "fish", "shrimp", "prawn"], kcal: 250.0, protein: 35.0, carbs: 0.0, fat: 11.0, indulgent: false },
    Profile { keywords: &["egg"], kcal: 140.0, protein: 12.0, carbs: 1.0, fat: 10.0, indulgent: false },
    Profile { keywords: &["tofu", "tempeh"], kcal: 180.0, protein: 20.0, carbs: 4.0, fat: 11.0, indulgent: false },
    Profile { keywords: &["lentil", "bean", "chickpea"], kcal: 230.0, protein: 18.0, carbs: 40.0, fat: 1.0, indulgent: false },
    Profile { keywords: &["rice", "quinoa", "couscous"], kcal: 400.0, protein: 8.0, carbs: 85.0, fat: 2.0, indulgent: false },
    Profile { keywords: &["pasta", "spaghetti", "noodle"], kcal: 420.0, protein: 15.0, carbs: 84.0, fat: 2.0, indulgent: false },
    Profile { keywords: &["bread", "tortilla", "flour"], kcal: 300.0, protein: 10.0, carbs: 60.0, fat: 3.0, indulgent: false },
    Profile { keywords: &["potato"], kcal: 220.0, protein: 5.0, carbs: 50.0, fat: 0.5, indulgent: false },
    Profile { keywords: &["cheese", "parmesan", "mozzarella"], kcal: 400.0, protein: 25.0, carbs: 2.0, fat: 33.0, indulgent: true },
    Profile { keywords: &["butter"], kcal: 720.0, protein: 1.0, carbs: 0.0, fat: 81.0, indulgent: true },
    Profile { keywords: &["cream"], kcal: 340.0, protein: 3.0, carbs: 3.0, fat: 36.0, indulgent: true },
    Profile { keywords: &["oil"], kcal: 240.0, protein: 0.0, carbs: 0.0, fat: 27.0, indulgent: false },
    Profile { keywords: &["sugar", "honey", "syrup", "chocolate"], kcal: 390.0, protein: 0.0, carbs: 100.0, fat: 0.0, indulgent: true },
    Profile { keywords: &["milk", "yogurt"], kcal: 150.0, protein: 8.0, carbs: 12.0, fat: 8.0, indulgent: false },
    Profile { keywords: &["nut", "almond", "peanut", "cashew"], kcal: 320.0, protein: 11.0, carbs: 10.0, fat: 28.0, indulgent: false },
];

/// Anything unmatched is treated as a vegetable, herb or seasoning
const PRODUCE: Profile = Profile {
    keywords: &[],
    kcal: 30.0,
    protein: 1.5,
    carbs: 6.0,
    fat: 0.2,
    indulgent: false,
};

fn profile_for(ingredient: &str) -> &'static Profile {
    let ingredient = ingredient.to_lowercase();
    PROFILES
        .iter()
        .find(|p| p.keywords.iter().any(|k| ingredient.contains(k)))
        .unwrap_or(&PRODUCE)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NutritionAnalyzer;

impl StructuredOperation for NutritionAnalyzer {
    type Input = RecipeSummary;
    type Output = NutritionAnalysis;

    const NAME: &'static str = "analyze_nutrition";

    fn system_prompt(&self) -> String {
        SYSTEM_PROMPT.to_string()
    }

    fn user_prompt(&self, input: &RecipeSummary) -> String {
        input.describe()
    }

    fn accept(&self, _input: &RecipeSummary, output: &NutritionAnalysis) -> bool {
        let amounts = [
            output.calories_per_serving,
            output.protein_g,
            output.carbs_g,
            output.fat_g,
        ];
        (1..=10).contains(&output.health_score)
            && output.calories_per_serving > 0.0
            && amounts.iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Keyword-table estimate
    fn fallback(&self, input: &RecipeSummary) -> NutritionAnalysis {
        let servings = f64::from(input.servings.unwrap_or(DEFAULT_SERVINGS).max(1));

        let (mut kcal, mut protein, mut carbs, mut fat) = (0.0, 0.0, 0.0, 0.0);
        let mut indulgent = 0;
        let mut produce = 0;
        for ingredient in &input.ingredients {
            let profile = profile_for(ingredient);
            kcal += profile.kcal;
            protein += profile.protein;
            carbs += profile.carbs;
            fat += profile.fat;
            if profile.indulgent {
                indulgent += 1;
            }
            if profile.keywords.is_empty() {
                produce += 1;
            }
        }

        let kcal = (kcal / servings).max(1.0);
        let protein = protein / servings;
        let carbs = carbs / servings;
        let fat = fat / servings;
        let fat_share = fat * 9.0 / kcal;

        let mut score: i32 = 6;
        let mut highlights = Vec::new();
        if protein >= 25.0 {
            highlights.push("High protein".to_string());
            score += 1;
        }
        if produce >= 3 {
            highlights.push("Plenty of vegetables".to_string());
            score += 1;
        }
        if fat_share < 0.2 {
            highlights.push("Low fat".to_string());
        } else if fat_share > 0.4 {
            score -= 2;
        }
        score -= indulgent;
        if kcal > 800.0 {
            score -= 1;
        }

        NutritionAnalysis {
            calories_per_serving: round1(kcal),
            protein_g: round1(protein),
            carbs_g: round1(carbs),
            fat_g: round1(fat),
            health_score: score.clamp(1, 10) as u8,
            highlights,
            warnings: vec![ESTIMATE_WARNING.to_string()],
        }
    }
}
