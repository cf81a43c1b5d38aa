#![allow(dead_code)]

use std::sync::Arc;
use std::{path::PathBuf, str::FromStr};

use chrono::NaiveDate;
use imkitchen_mealplan::{
    EngineSettings, GenerationEngine, InMemoryWeekPlanStore, StaticProfile, StaticRecipePool,
};
use imkitchen_shared::mealplan::WeekPlan;
use imkitchen_shared::recipe::{Complexity, MealType, Recipe};
use imkitchen_shared::user::UserDietaryProfile;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub const MAINS: [&str; 10] = [
    "chicken", "turkey", "beef", "pork", "salmon", "tuna", "shrimp", "cod", "tofu", "lentil",
];

pub const CUISINES: [&str; 4] = ["italian", "mexican", "thai", "greek"];

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Monday 2025-01-20.
pub fn monday() -> NaiveDate {
    date(2025, 1, 20)
}

pub fn breakfasts(count: usize) -> Vec<Recipe> {
    let bases = ["Berry Oat Bowl", "Banana Pancakes", "Veggie Omelette", "Yogurt Parfait", "Chia Pudding"];

    (0..count)
        .map(|i| {
            Recipe::new(
                format!("breakfast-{i}"),
                format!("{} {i}", bases[i % bases.len()]),
            )
            .meal_type(MealType::Breakfast)
            .calories(520 + i as u32 * 15)
            .macros(20.0, 60.0, 15.0, 6.0)
            .complexity(Complexity::Simple)
            .ingredients([format!("{} g oats", 40 + i), "1 cup milk".to_owned()])
        })
        .collect()
}

/// Lunch and dinner candidates. Every one uses a different main-ingredient
/// and cuisine pairing, all within 20% of a 700 kcal target.
pub fn mains(count: usize) -> Vec<Recipe> {
    (0..count)
        .map(|i| {
            let main = MAINS[i % MAINS.len()];
            let cuisine = CUISINES[i % CUISINES.len()];
            let meal_type = if i % 2 == 0 {
                MealType::Lunch
            } else {
                MealType::Dinner
            };

            Recipe::new(format!("main-{i}"), format!("{main} grain bowl {i}"))
                .meal_type(meal_type)
                .calories(600 + i as u32 * 10)
                .macros(40.0, 55.0, 20.0, 8.0)
                .tags([cuisine])
                .ingredients([format!("200 g {main}"), format!("{} g rice", 80 + i)])
        })
        .collect()
}

pub fn pool() -> Vec<Recipe> {
    let mut recipes = breakfasts(10);
    recipes.extend(mains(20));
    recipes
}

pub struct Harness {
    pub engine: GenerationEngine,
    pub pool: Arc<StaticRecipePool>,
    pub store: Arc<InMemoryWeekPlanStore>,
}

impl Harness {
    pub fn new(recipes: Vec<Recipe>, profile: UserDietaryProfile) -> Self {
        Self::build(StaticRecipePool::new(recipes), profile, WeekPlan::default())
    }

    pub fn build(pool: StaticRecipePool, profile: UserDietaryProfile, plan: WeekPlan) -> Self {
        Self::with_local(pool, profile, plan, vec![])
    }

    pub fn with_local(
        pool: StaticRecipePool,
        profile: UserDietaryProfile,
        plan: WeekPlan,
        local: Vec<Recipe>,
    ) -> Self {
        let pool = Arc::new(pool);
        let store = Arc::new(InMemoryWeekPlanStore::new(plan));
        let engine = GenerationEngine::new(
            pool.clone(),
            Arc::new(local),
            Arc::new(StaticProfile(profile)),
            store.clone(),
        );

        Self {
            engine,
            pool,
            store,
        }
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.engine = self.engine.with_settings(settings);
        self
    }

    pub fn bundled(mut self, recipes: Vec<Recipe>) -> Self {
        self.engine = self.engine.with_bundled(recipes);
        self
    }

    pub async fn plan(&self) -> WeekPlan {
        self.store.snapshot().await
    }
}

pub async fn setup_sqlite(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    imkitchen_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(pool)
}
