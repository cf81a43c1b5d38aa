use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::UserDietaryProfile;
use serde::Serialize;
use strum::{AsRefStr, Display};
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, timeout_at};

use crate::cache::{PoolCache, PoolSignature};
use crate::classifier::{Classifier, KeywordClassifier};
use crate::cost::Weights;
use crate::fallback::Tier;
use crate::provider::{LocalRecipeRepository, PoolQuery, RecipePoolProvider, UserProfileProvider};
use crate::store::WeekPlanStore;

#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Shared deadline for one fan-out of pool fetches.
    pub fetch_timeout: Duration,
    pub cache_ttl: Duration,
    pub pool_limit: usize,
    pub alternatives_limit: usize,
    pub weights: Weights,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(2500),
            cache_ttl: crate::cache::DEFAULT_TTL,
            pool_limit: 50,
            alternatives_limit: 5,
            weights: Weights::DEFAULT,
        }
    }
}

#[derive(Display, AsRefStr, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    #[default]
    Idle,
    FetchingPools,
    AssigningSlots,
    PlantBasedCheck,
    Done,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Progress {
    pub phase: GenerationPhase,
    pub value: f32,
}

/// Monotonic progress for one invocation.
pub(crate) struct ProgressReporter<'a> {
    sender: &'a watch::Sender<Progress>,
}

impl<'a> ProgressReporter<'a> {
    pub(crate) fn start(sender: &'a watch::Sender<Progress>) -> Self {
        sender.send_replace(Progress::default());
        Self { sender }
    }

    pub(crate) fn report(&self, phase: GenerationPhase, value: f32) {
        self.sender.send_modify(|progress| {
            progress.phase = phase;
            progress.value = progress.value.max(value.clamp(0.0, 1.0));
        });
    }

    pub(crate) fn done(&self) {
        self.report(GenerationPhase::Done, 1.0);
    }
}

/// Meal-plan generator. One instance owns the pool cache and serialises
/// invocations; per-call variety state lives in the run.
pub struct GenerationEngine {
    pub(crate) pool: Arc<dyn RecipePoolProvider>,
    pub(crate) local: Arc<dyn LocalRecipeRepository>,
    pub(crate) bundled: Vec<Recipe>,
    pub(crate) profiles: Arc<dyn UserProfileProvider>,
    pub(crate) store: Arc<dyn WeekPlanStore>,
    pub(crate) classifier: Arc<dyn Classifier>,
    pub(crate) settings: EngineSettings,
    cache: Mutex<PoolCache>,
    pub(crate) run_lock: Mutex<()>,
    pub(crate) progress: watch::Sender<Progress>,
}

impl GenerationEngine {
    pub fn new(
        pool: Arc<dyn RecipePoolProvider>,
        local: Arc<dyn LocalRecipeRepository>,
        profiles: Arc<dyn UserProfileProvider>,
        store: Arc<dyn WeekPlanStore>,
    ) -> Self {
        let settings = EngineSettings::default();

        Self {
            pool,
            local,
            bundled: crate::bundled::default_recipes(),
            profiles,
            store,
            classifier: Arc::new(KeywordClassifier),
            cache: Mutex::new(PoolCache::new(settings.cache_ttl)),
            settings,
            run_lock: Mutex::new(()),
            progress: watch::Sender::new(Progress::default()),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.cache = Mutex::new(PoolCache::new(settings.cache_ttl));
        self.settings = settings;
        self
    }

    pub fn with_bundled(mut self, recipes: Vec<Recipe>) -> Self {
        self.bundled = recipes;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// One pool per meal type, served from cache when fresh. Missing pools are
    /// fetched concurrently against a single deadline; a timeout or provider
    /// error yields an empty pool.
    pub(crate) async fn fetch_pools(
        &self,
        profile: &UserDietaryProfile,
        meal_types: &[MealType],
    ) -> HashMap<MealType, Arc<Vec<Recipe>>> {
        let signature = PoolSignature::from_profile(profile);
        let mut pools = HashMap::new();
        let mut missing = vec![];

        {
            let mut cache = self.cache.lock().await;
            for meal_type in meal_types {
                match cache.get(&signature, *meal_type) {
                    Some(pool) => {
                        pools.insert(*meal_type, pool);
                    }
                    None => missing.push(*meal_type),
                }
            }
        }

        if missing.is_empty() {
            return pools;
        }

        let deadline = Instant::now() + self.settings.fetch_timeout;
        let tolerance = Tier::Primary.calorie_tolerance().unwrap_or(0.2);
        let limit = self.settings.pool_limit;

        let fetches = missing.into_iter().map(|meal_type| {
            let provider = self.pool.clone();
            let query = PoolQuery::for_profile(profile, meal_type, tolerance);

            async move {
                let res = timeout_at(deadline, provider.fetch(meal_type, &query, limit)).await;
                (meal_type, res)
            }
        });

        let mut fetched = vec![];
        for (meal_type, res) in join_all(fetches).await {
            let recipes = match res {
                Ok(Ok(recipes)) => recipes,
                Ok(Err(err)) => {
                    tracing::warn!(err = %err, meal_type = %meal_type, "recipe pool fetch failed");
                    vec![]
                }
                Err(_) => {
                    tracing::warn!(meal_type = %meal_type, "recipe pool fetch timed out");
                    vec![]
                }
            };

            fetched.push((meal_type, Arc::new(recipes)));
        }

        let mut cache = self.cache.lock().await;
        for (meal_type, recipes) in fetched {
            cache.insert(signature.clone(), meal_type, recipes.clone());
            pools.insert(meal_type, recipes);
        }

        pools
    }
}
