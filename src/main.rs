//! recipe-gateway - command line front end
//!
//! Runs one operation against the configured upstreams and prints the
//! result as JSON.

#![allow(missing_docs)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use recipe_gateway::core::operations::{Diet, RecipeSummary, RecommendationContext};
use recipe_gateway::utils::logging::init_logging;
use recipe_gateway::{Config, RecipeAssistant};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "recipe-gateway", version, about = "Cached, key-rotating, fallback-aware recipe upstreams")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "RECIPE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Turn free text into search parameters
    Normalize { text: String },

    /// Suggest dishes for the current weather
    Recommend {
        /// Temperature in degrees Celsius
        #[arg(long = "temp", allow_negative_numbers = true)]
        temperature: Option<f64>,
        #[arg(long)]
        condition: Option<String>,
        #[arg(long)]
        meal: Option<String>,
        #[arg(long = "preference")]
        preferences: Vec<String>,
    },

    /// Estimate nutrition for a recipe
    Nutrition {
        #[arg(long)]
        title: String,
        #[arg(long = "ingredient", required = true)]
        ingredients: Vec<String>,
        #[arg(long)]
        servings: Option<u32>,
    },

    /// Adapt a recipe to a diet
    Convert {
        #[arg(long)]
        diet: Diet,
        #[arg(long)]
        title: String,
        #[arg(long = "ingredient", required = true)]
        ingredients: Vec<String>,
    },

    /// Search recipes
    Search {
        text: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

fn recipe(title: String, ingredients: Vec<String>, servings: Option<u32>) -> RecipeSummary {
    let recipe = RecipeSummary::new(title, ingredients);
    match servings {
        Some(servings) => recipe.with_servings(servings),
        None => recipe,
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{}", rendered);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;
    init_logging(&config.logging);

    let assistant = RecipeAssistant::from_config(&config).await?;

    match cli.command {
        Command::Normalize { text } => print_json(&assistant.normalize_query(&text).await?),
        Command::Recommend {
            temperature,
            condition,
            meal,
            preferences,
        } => {
            let context = RecommendationContext {
                temperature_c: temperature,
                condition,
                meal,
                preferences,
            };
            print_json(&assistant.recommend(&context).await?)
        }
        Command::Nutrition {
            title,
            ingredients,
            servings,
        } => print_json(
            &assistant
                .analyze_nutrition(&recipe(title, ingredients, servings))
                .await?,
        ),
        Command::Convert {
            diet,
            title,
            ingredients,
        } => print_json(
            &assistant
                .convert_diet(&recipe(title, ingredients, None), diet)
                .await?,
        ),
        Command::Search { text, page } => print_json(&assistant.search(&text, page).await?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
