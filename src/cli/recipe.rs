use imkitchen_mealplan::SqliteRecipePool;
use imkitchen_planner::Config;
use imkitchen_shared::recipe::Recipe;

pub async fn migrate(config: Config) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");

    let pool = imkitchen_planner::create_pool(&config.database.url, 1).await?;
    imkitchen_planner::db::migrate(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

pub async fn import(config: Config, file: String) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&file)?;
    let recipes = serde_json::from_str::<Vec<Recipe>>(&content)?;

    let pool = imkitchen_planner::create_pool(&config.database.url, 1).await?;
    let imported = SqliteRecipePool(pool).import(&recipes).await?;

    tracing::info!(file = %file, recipes = imported, "recipes imported");

    super::print_json(&serde_json::json!({ "imported": imported }))
}
