use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::{DietType, UserDietaryProfile};

/// Filters forwarded to a recipe pool. Providers may apply them partially;
/// the engine re-checks everything it relies on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoolQuery {
    pub diet_type: DietType,
    pub allergies: Vec<String>,
    pub excluded_ingredients: Vec<String>,
    pub fitness_goal: Option<String>,
    pub calorie_range: Option<(u32, u32)>,
    pub exclude_ids: Vec<String>,
}

impl PoolQuery {
    /// Query for one meal type with a calorie range of `tolerance` around the
    /// meal's share of the daily goal.
    pub fn for_profile(profile: &UserDietaryProfile, meal_type: MealType, tolerance: f64) -> Self {
        let target = meal_type.target_calories(profile.calorie_goal);
        let min = (target * (1.0 - tolerance)).max(0.0).floor() as u32;
        let max = (target * (1.0 + tolerance)).ceil() as u32;

        Self {
            diet_type: profile.diet_type,
            allergies: profile.allergies.to_vec(),
            excluded_ingredients: profile.excluded_ingredients.to_vec(),
            fitness_goal: profile.primary_fitness_goal().map(str::to_owned),
            calorie_range: Some((min, max)),
            exclude_ids: vec![],
        }
    }

    pub fn exclude_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }

    /// Provider-side match used by the bundled pool implementations: meal type
    /// hint, calorie range and excluded ids.
    pub fn matches(&self, meal_type: MealType, recipe: &Recipe) -> bool {
        let meal_ok = match (meal_type, recipe.meal_type) {
            (_, None) => true,
            (MealType::Breakfast, Some(hint)) => hint == MealType::Breakfast,
            (_, Some(hint)) => hint != MealType::Breakfast,
        };

        let calories_ok = self
            .calorie_range
            .is_none_or(|(min, max)| (min..=max).contains(&recipe.nutrition.calories));

        meal_ok && calories_ok && !self.exclude_ids.contains(&recipe.id)
    }
}

/// Primary, possibly remote, source of candidates. May be slow or fail; the
/// engine bounds every call with a deadline.
#[async_trait::async_trait]
pub trait RecipePoolProvider: Send + Sync {
    async fn fetch(
        &self,
        meal_type: MealType,
        query: &PoolQuery,
        limit: usize,
    ) -> anyhow::Result<Vec<Recipe>>;

    /// Lookup by id, used to resolve manual swaps.
    async fn find(&self, _id: &str) -> anyhow::Result<Option<Recipe>> {
        Ok(None)
    }
}

/// Offline recipe collection, always available.
pub trait LocalRecipeRepository: Send + Sync {
    fn all(&self) -> Vec<Recipe>;
}

impl LocalRecipeRepository for Vec<Recipe> {
    fn all(&self) -> Vec<Recipe> {
        self.clone()
    }
}

/// Local repository loaded once from a JSON array file.
#[derive(Clone, Debug, Default)]
pub struct JsonRecipeFile {
    recipes: Vec<Recipe>,
}

impl JsonRecipeFile {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let recipes = serde_json::from_str::<Vec<Recipe>>(&content)?;

        tracing::debug!(
            path = %path.as_ref().display(),
            recipes = recipes.len(),
            "local recipes loaded"
        );

        Ok(Self { recipes })
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl LocalRecipeRepository for JsonRecipeFile {
    fn all(&self) -> Vec<Recipe> {
        self.recipes.clone()
    }
}

pub trait UserProfileProvider: Send + Sync {
    fn profile(&self) -> UserDietaryProfile;
}

#[derive(Clone, Debug, Default)]
pub struct StaticProfile(pub UserDietaryProfile);

impl UserProfileProvider for StaticProfile {
    fn profile(&self) -> UserDietaryProfile {
        self.0.clone()
    }
}

/// In-memory pool. An optional delay simulates a slow remote source.
#[derive(Debug, Default)]
pub struct StaticRecipePool {
    recipes: Vec<Recipe>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticRecipePool {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes,
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecipePoolProvider for StaticRecipePool {
    async fn fetch(
        &self,
        meal_type: MealType,
        query: &PoolQuery,
        limit: usize,
    ) -> anyhow::Result<Vec<Recipe>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self
            .recipes
            .iter()
            .filter(|r| query.matches(meal_type, r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find(&self, id: &str) -> anyhow::Result<Option<Recipe>> {
        Ok(self.recipes.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_calorie_range_from_split() {
        let profile = UserDietaryProfile::default();
        let query = PoolQuery::for_profile(&profile, MealType::Breakfast, 0.2);

        assert_eq!(query.calorie_range, Some((480, 720)));
        assert_eq!(query.fitness_goal, None);
    }

    #[test]
    fn test_query_matches_meal_hint() {
        let query = PoolQuery::default();
        let breakfast = Recipe::new("1", "Oats").meal_type(MealType::Breakfast);
        let lunch = Recipe::new("2", "Salad").meal_type(MealType::Lunch);
        let untyped = Recipe::new("3", "Soup");

        assert!(query.matches(MealType::Breakfast, &breakfast));
        assert!(!query.matches(MealType::Dinner, &breakfast));
        assert!(query.matches(MealType::Dinner, &lunch));
        assert!(!query.matches(MealType::Breakfast, &lunch));
        assert!(query.matches(MealType::Breakfast, &untyped));

        let query = PoolQuery::default().exclude_ids(["3".to_owned()]);
        assert!(!query.matches(MealType::Lunch, &untyped));
    }

    #[tokio::test]
    async fn test_static_pool_limit_and_count() {
        let pool = StaticRecipePool::new(
            (0..5)
                .map(|i| Recipe::new(i.to_string(), "Soup").calories(500))
                .collect(),
        );

        let recipes = pool
            .fetch(MealType::Lunch, &PoolQuery::default(), 3)
            .await
            .unwrap();

        assert_eq!(recipes.len(), 3);
        assert_eq!(pool.fetch_count(), 1);
        assert_eq!(pool.find("4").await.unwrap().map(|r| r.id), Some("4".to_owned()));
    }
}
