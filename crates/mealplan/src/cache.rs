use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::{DietType, UserDietaryProfile};
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Profile fields that change what a pool fetch returns.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolSignature {
    diet_type: DietType,
    allergies: Vec<String>,
    exclusions: Vec<String>,
    calorie_goal: u32,
    fitness_goal: Option<String>,
}

impl PoolSignature {
    pub fn from_profile(profile: &UserDietaryProfile) -> Self {
        Self {
            diet_type: profile.diet_type,
            allergies: normalized(&profile.allergies),
            exclusions: normalized(&profile.excluded_ingredients),
            calorie_goal: profile.calorie_goal,
            fitness_goal: profile.primary_fitness_goal().map(str::to_owned),
        }
    }
}

fn normalized(terms: &[String]) -> Vec<String> {
    let mut terms = terms
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>();
    terms.sort();
    terms.dedup();
    terms
}

struct Entry {
    fetched_at: Instant,
    recipes: Arc<Vec<Recipe>>,
}

/// Time-boxed pools keyed by profile signature and meal type.
pub struct PoolCache {
    ttl: Duration,
    entries: HashMap<(PoolSignature, MealType), Entry>,
}

impl Default for PoolCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl PoolCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, signature: &PoolSignature, meal_type: MealType) -> Option<Arc<Vec<Recipe>>> {
        let key = (signature.clone(), meal_type);
        let entry = self.entries.get(&key)?;

        if entry.fetched_at.elapsed() >= self.ttl {
            self.entries.remove(&key);
            return None;
        }

        Some(entry.recipes.clone())
    }

    /// Empty pools are not cached so the next call tries again.
    pub fn insert(
        &mut self,
        signature: PoolSignature,
        meal_type: MealType,
        recipes: Arc<Vec<Recipe>>,
    ) {
        if recipes.is_empty() {
            return;
        }

        self.entries.insert(
            (signature, meal_type),
            Entry {
                fetched_at: Instant::now(),
                recipes,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
