use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use imkitchen_shared::recipe::MealType;

mod cli;

/// imkitchen planner - meal plan generation
#[derive(Parser)]
#[command(name = "imkitchen-planner")]
#[command(about = "Generate breakfast, lunch and dinner plans from your recipes", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load recipes from a JSON array file into the recipe pool
    Import { file: String },
    /// Fill the empty slots of a day, or replace one meal
    Day {
        date: NaiveDate,
        #[arg(long)]
        meal: Option<MealType>,
    },
    /// Clear and refill a day, keeping leftovers of other days
    Regenerate { date: NaiveDate },
    /// Fill every empty slot between two dates
    Week { start: NaiveDate, end: NaiveDate },
    /// Put a recipe into an occupied slot
    Swap {
        date: NaiveDate,
        meal: MealType,
        recipe_id: String,
    },
    /// List replacement candidates for a slot
    Alternatives {
        date: NaiveDate,
        meal: MealType,
        current_recipe_id: String,
    },
    /// Print the stored plan between two dates
    Show { start: NaiveDate, end: NaiveDate },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = imkitchen_planner::Config::load(cli.config)?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    imkitchen_planner::observability::init_observability(
        "imkitchen-planner",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
        config.observability.json,
    )?;

    match cli.command {
        Commands::Migrate => cli::migrate(config).await,
        Commands::Import { file } => cli::import(config, file).await,
        Commands::Day { date, meal } => cli::day(config, date, meal).await,
        Commands::Regenerate { date } => cli::regenerate(config, date).await,
        Commands::Week { start, end } => cli::week(config, start, end).await,
        Commands::Swap {
            date,
            meal,
            recipe_id,
        } => cli::swap(config, date, meal, recipe_id).await,
        Commands::Alternatives {
            date,
            meal,
            current_recipe_id,
        } => cli::alternatives(config, date, meal, current_recipe_id).await,
        Commands::Show { start, end } => cli::show(config, start, end).await,
    }
}
