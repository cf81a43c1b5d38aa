use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use imkitchen_shared::mealplan::{DailyMealPlan, MealSlot, SlotRef, WeekPlan};
use imkitchen_shared::recipe::{MealType, Recipe};
use tokio::time::timeout;

use crate::cost::{CostInput, cost, rank};
use crate::engine::GenerationEngine;
use crate::fallback::Tier;
use crate::leftover;
use crate::provider::PoolQuery;
use crate::run::iso_week;
use crate::suitability::SuitabilityFilter;

impl GenerationEngine {
    /// Puts `recipe_id` into an occupied slot, keeping its servings. Returns
    /// `false` without touching the store when the slot is empty, the recipe
    /// is already used elsewhere in the week, or it cannot be resolved or is
    /// not eligible for the slot.
    ///
    /// Leftovers of the replaced recipe are removed. Swapping a leftover slot
    /// detaches it from the meal it came from.
    #[tracing::instrument(skip(self))]
    pub async fn swap_meal(&self, date: NaiveDate, meal_type: MealType, recipe_id: &str) -> bool {
        let _guard = self.run_lock.lock().await;

        match self.try_swap(date, meal_type, recipe_id).await {
            Ok(swapped) => swapped,
            Err(err) => {
                tracing::error!(err = %err, "swap failed");
                false
            }
        }
    }

    async fn try_swap(
        &self,
        date: NaiveDate,
        meal_type: MealType,
        recipe_id: &str,
    ) -> anyhow::Result<bool> {
        let (start, end) = iso_week(date);
        let mut plan = self.store.load_range(start, end).await?;
        let target = SlotRef::new(date, meal_type);

        let Some(current) = plan.slot(target) else {
            tracing::debug!("slot is empty");
            return Ok(false);
        };

        if current.recipe_id == recipe_id {
            return Ok(true);
        }

        if plan.uses_recipe_elsewhere(recipe_id, target) {
            tracing::debug!("recipe already used this week");
            return Ok(false);
        }

        let servings = current.servings;
        let source = current
            .leftover_source
            .as_ref()
            .map(|s| SlotRef::new(s.source_date, s.source_meal_type));

        // Linked slots may sit outside the ISO week.
        let outside = current
            .projected_to
            .iter()
            .copied()
            .chain(source)
            .map(|slot| slot.date)
            .filter(|d| *d < start || *d > end)
            .collect::<BTreeSet<_>>();

        let Some(recipe) = self.resolve_recipe(recipe_id).await else {
            tracing::debug!("recipe not found");
            return Ok(false);
        };

        let profile = self.profiles.profile();
        let filter = SuitabilityFilter::from_profile(&profile);
        let classifier = self.classifier.as_ref();

        if !classifier.matches_meal_type(&recipe, meal_type)
            || !filter.is_suitable(&recipe, classifier)
        {
            tracing::debug!("recipe not eligible for slot");
            return Ok(false);
        }

        let mut slot = MealSlot::from_recipe(&recipe);
        slot.set_servings(servings)?;

        for day in outside {
            let extra = self.store.load_range(day, day).await?;
            plan.days.extend(extra.days);
        }

        let mut touched = BTreeSet::from([date]);

        let cleared = leftover::clear_projections(&mut plan, target);
        if !cleared.is_empty() {
            tracing::debug!(leftovers = cleared.len(), "removed leftovers of replaced recipe");
        }
        touched.extend(cleared.iter().map(|t| t.date));

        if let Some(source) = source
            && let Some(source_slot) = plan.slot_mut(source)
        {
            source_slot.projected_to.retain(|t| *t != target);
            touched.insert(source.date);
        }

        plan.day_mut(date).set(meal_type, slot);

        let days = touched
            .into_iter()
            .map(|d| plan.day(d).cloned().unwrap_or_else(|| DailyMealPlan::new(d)))
            .collect::<Vec<_>>();
        self.store.save_days(&days).await?;

        Ok(true)
    }

    async fn resolve_recipe(&self, recipe_id: &str) -> Option<Recipe> {
        match timeout(self.settings.fetch_timeout, self.pool.find(recipe_id)).await {
            Ok(Ok(Some(recipe))) => return Some(recipe),
            Ok(Ok(None)) => {}
            Ok(Err(err)) => tracing::warn!(err = %err, "recipe lookup failed"),
            Err(_) => tracing::warn!("recipe lookup timed out"),
        }

        self.local
            .all()
            .into_iter()
            .find(|r| r.id == recipe_id)
            .or_else(|| self.bundled.iter().find(|r| r.id == recipe_id).cloned())
    }

    /// Up to `alternatives_limit` eligible recipes for the slot, not used
    /// elsewhere in the week, best calorie fit first.
    #[tracing::instrument(skip(self))]
    pub async fn get_alternative_recipes(
        &self,
        date: NaiveDate,
        meal_type: MealType,
        current_recipe_id: &str,
    ) -> Vec<Recipe> {
        let _guard = self.run_lock.lock().await;

        let profile = self.profiles.profile();
        let filter = SuitabilityFilter::from_profile(&profile);
        let classifier = self.classifier.as_ref();
        let (start, end) = iso_week(date);

        let plan = match self.store.load_range(start, end).await {
            Ok(plan) => plan,
            Err(err) => {
                tracing::warn!(err = %err, "failed to load meal plan");
                WeekPlan::default()
            }
        };

        let used = plan
            .slots()
            .map(|(_, s)| s.recipe_id.to_owned())
            .chain(std::iter::once(current_recipe_id.to_owned()))
            .collect::<HashSet<_>>();

        let tolerance = Tier::Local.calorie_tolerance().unwrap_or(0.4);
        let query = PoolQuery::for_profile(&profile, meal_type, tolerance)
            .exclude_ids(used.iter().cloned());

        let pool = match timeout(
            self.settings.fetch_timeout,
            self.pool.fetch(meal_type, &query, self.settings.pool_limit),
        )
        .await
        {
            Ok(Ok(recipes)) => recipes,
            Ok(Err(err)) => {
                tracing::warn!(err = %err, "recipe pool fetch failed");
                vec![]
            }
            Err(_) => {
                tracing::warn!("recipe pool fetch timed out");
                vec![]
            }
        };

        let local = self.local.all();
        let mut seen = HashSet::new();
        let candidates = pool
            .iter()
            .chain(local.iter())
            .chain(self.bundled.iter())
            .filter(|r| !used.contains(&r.id))
            .filter(|r| classifier.matches_meal_type(r, meal_type))
            .filter(|r| filter.is_suitable(r, classifier))
            .filter(|r| seen.insert(r.id.as_str()))
            .collect::<Vec<_>>();

        let target = meal_type.target_calories(profile.calorie_goal);

        rank(&candidates, |recipe| {
            let input = CostInput {
                calories: recipe.nutrition.calories,
                target_calories: target,
                is_exact_repeat: false,
                same_main_as_neighbor: false,
                same_cuisine_as_neighbor: false,
                main_already_used_today: false,
                complexity: classifier.complexity(recipe),
                meal_type,
                batch_friendly: classifier.is_batch_friendly(recipe),
                ingredient_overlap: 0.0,
                weekly: None,
            };

            cost(&input, &profile.preferences, &self.settings.weights)
        })
        .into_iter()
        .take(self.settings.alternatives_limit)
        .map(|s| s.recipe.clone())
        .collect()
    }
}
