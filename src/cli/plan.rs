use chrono::NaiveDate;
use imkitchen_mealplan::{SqliteWeekPlanStore, WeekPlanStore};
use imkitchen_planner::Config;
use imkitchen_shared::recipe::MealType;

use super::print_json;

async fn engine(config: &Config) -> anyhow::Result<imkitchen_mealplan::GenerationEngine> {
    let pool =
        imkitchen_planner::create_pool(&config.database.url, config.database.max_connections)
            .await?;

    imkitchen_planner::create_engine(config, pool)
}

pub async fn day(config: Config, date: NaiveDate, meal: Option<MealType>) -> anyhow::Result<()> {
    let result = engine(&config)
        .await?
        .generate_meal_plan(date, &[], meal)
        .await;

    print_json(&result)
}

pub async fn regenerate(config: Config, date: NaiveDate) -> anyhow::Result<()> {
    let result = engine(&config).await?.regenerate_day(date, &[]).await;

    print_json(&result)
}

pub async fn week(config: Config, start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    let result = engine(&config)
        .await?
        .generate_weekly_meal_plan(start, end)
        .await;

    print_json(&result)
}

pub async fn swap(
    config: Config,
    date: NaiveDate,
    meal: MealType,
    recipe_id: String,
) -> anyhow::Result<()> {
    let swapped = engine(&config)
        .await?
        .swap_meal(date, meal, &recipe_id)
        .await;

    print_json(&serde_json::json!({ "swapped": swapped }))
}

pub async fn alternatives(
    config: Config,
    date: NaiveDate,
    meal: MealType,
    current_recipe_id: String,
) -> anyhow::Result<()> {
    let recipes = engine(&config)
        .await?
        .get_alternative_recipes(date, meal, &current_recipe_id)
        .await;

    print_json(&recipes)
}

pub async fn show(config: Config, start: NaiveDate, end: NaiveDate) -> anyhow::Result<()> {
    let pool = imkitchen_planner::create_pool(&config.database.url, 1).await?;
    let store = SqliteWeekPlanStore::new(pool, &config.database.user_id);
    let plan = store.load_range(start, end).await?;

    print_json(&plan.days.values().collect::<Vec<_>>())
}
