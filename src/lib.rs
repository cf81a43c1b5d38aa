pub mod config;
pub mod db;
pub mod observability;

use std::sync::Arc;

use imkitchen_mealplan::{
    GenerationEngine, JsonRecipeFile, LocalRecipeRepository, SqliteRecipePool,
    SqliteWeekPlanStore, StaticProfile,
};
use imkitchen_shared::recipe::Recipe;
use sqlx::SqlitePool;

pub use config::Config;
pub use db::create_pool;

/// Engine wired to the SQLite recipe pool and week plan store, with the
/// configured profile and optional local recipe file.
pub fn create_engine(config: &Config, pool: SqlitePool) -> anyhow::Result<GenerationEngine> {
    let local: Arc<dyn LocalRecipeRepository> = match &config.recipes.local_path {
        Some(path) => Arc::new(JsonRecipeFile::load(path)?),
        None => Arc::new(Vec::<Recipe>::new()),
    };

    let engine = GenerationEngine::new(
        Arc::new(SqliteRecipePool(pool.clone())),
        local,
        Arc::new(StaticProfile(config.profile.clone())),
        Arc::new(SqliteWeekPlanStore::new(pool, &config.database.user_id)),
    )
    .with_settings(config.engine.settings());

    Ok(engine)
}
