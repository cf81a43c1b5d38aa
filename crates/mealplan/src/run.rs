//! Per-invocation state shared by the daily and weekly generators.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Weekday};
use imkitchen_shared::mealplan::{DailyMealPlan, MealSlot, ProjectionKind, SlotRef, WeekPlan};
use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::{DietType, UserDietaryProfile};

use crate::classifier::Classifier;
use crate::cost::{CostInput, WeeklyUsage, cost, ingredient_overlap};
use crate::engine::{GenerationEngine, GenerationPhase, ProgressReporter};
use crate::fallback::{Sources, SlotRequest, Tier, cascade, plant_based};
use crate::leftover;
use crate::result::{GenerationResult, SlotFailure, total_failure_message};
use crate::suitability::{FilterStats, SuitabilityFilter};
use crate::variety::VarietyTracker;

/// Relative deviation from a calorie target that gets reported.
pub(crate) const CALORIE_TOLERANCE: f64 = 0.20;

/// Monday..=Sunday around `date`.
pub(crate) fn iso_week(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = date.week(Weekday::Mon);

    (week.first_day(), week.last_day())
}

pub(crate) fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}

pub(crate) fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

/// Descriptors of the picks around a slot, computed once before scoring.
#[derive(Default)]
struct SlotContext {
    neighbor_main: Option<String>,
    neighbor_cuisine: Option<String>,
    today_mains: Vec<String>,
    nearby_ingredients: Vec<String>,
}

enum Outcome {
    Picked(Recipe, Tier),
    Exhausted(FilterStats),
}

pub(crate) struct Run<'e> {
    engine: &'e GenerationEngine,
    pub(crate) profile: UserDietaryProfile,
    filter: SuitabilityFilter,
    pools: HashMap<MealType, Arc<Vec<Recipe>>>,
    local: Vec<Recipe>,
    index: HashMap<String, Recipe>,
    pub(crate) plan: WeekPlan,
    original: WeekPlan,
    tracker: VarietyTracker,
    weekly: bool,
    /// Date whose slots are tagged without a date prefix.
    focus: Option<NaiveDate>,
    /// Last date projections may land on.
    pub(crate) projection_end: NaiveDate,
    generated: Vec<(SlotRef, String)>,
    suggestions: Vec<String>,
    failures: Vec<SlotFailure>,
    pub(crate) progress: ProgressReporter<'e>,
}

impl<'e> Run<'e> {
    /// Fetches pools, loads `load_start..=load_end` and builds the recipe
    /// index. The variety tracker starts empty; call [`Run::seed`] once the
    /// plan is in its pre-generation shape.
    pub(crate) async fn prepare(
        engine: &'e GenerationEngine,
        fallback_recipes: &[Recipe],
        meal_types: &[MealType],
        load_start: NaiveDate,
        load_end: NaiveDate,
        focus: Option<NaiveDate>,
    ) -> Result<Run<'e>, GenerationResult> {
        let progress = ProgressReporter::start(&engine.progress);
        let profile = engine.profiles.profile();

        progress.report(GenerationPhase::FetchingPools, 0.05);
        let pools = engine.fetch_pools(&profile, meal_types).await;
        progress.report(GenerationPhase::FetchingPools, 0.4);

        let plan = match engine.store.load_range(load_start, load_end).await {
            Ok(plan) => plan,
            Err(err) => {
                tracing::error!(err = %err, "failed to load meal plan");
                progress.done();

                return Err(GenerationResult::failed(
                    "Failed to load the current meal plan",
                    vec!["Try again in a moment".to_owned()],
                ));
            }
        };

        let mut seen = HashSet::new();
        let local = fallback_recipes
            .iter()
            .cloned()
            .chain(engine.local.all())
            .filter(|r| seen.insert(r.id.to_owned()))
            .collect::<Vec<_>>();

        let mut index = HashMap::new();
        for recipe in engine
            .bundled
            .iter()
            .chain(local.iter())
            .chain(pools.values().flat_map(|p| p.iter()))
        {
            index.insert(recipe.id.to_owned(), recipe.clone());
        }

        Ok(Run {
            engine,
            filter: SuitabilityFilter::from_profile(&profile),
            profile,
            pools,
            local,
            index,
            original: plan.clone(),
            plan,
            tracker: VarietyTracker::new(),
            weekly: false,
            focus,
            projection_end: load_end,
            generated: vec![],
            suggestions: vec![],
            failures: vec![],
            progress,
        })
    }

    pub(crate) fn weekly(mut self) -> Self {
        self.weekly = true;
        self
    }

    fn classifier(&self) -> &'e dyn Classifier {
        self.engine.classifier.as_ref()
    }

    fn resolve(&self, recipe_id: &str) -> Option<&Recipe> {
        self.index.get(recipe_id)
    }

    /// Commits every occupied slot in `start..=end`. Projections only commit
    /// their id since their source already counted the descriptors.
    pub(crate) fn seed(&mut self, start: NaiveDate, end: NaiveDate) {
        let classifier = self.classifier();

        for (slot, meal_slot) in self.plan.slots() {
            if slot.date < start || slot.date > end {
                continue;
            }

            match self.index.get(&meal_slot.recipe_id) {
                Some(recipe) if !meal_slot.is_linked() => self.tracker.commit(recipe, classifier),
                _ => self.tracker.commit_id(&meal_slot.recipe_id),
            }
        }
    }

    fn tag(&self, slot: SlotRef, label: &str) -> String {
        if self.focus == Some(slot.date) {
            label.to_owned()
        } else {
            format!("{}:{label}", slot.date)
        }
    }

    fn record(&mut self, slot: SlotRef, label: &str) {
        let tag = self.tag(slot, label);
        self.generated.retain(|(s, _)| *s != slot);
        self.generated.push((slot, tag));
    }

    pub(crate) fn was_generated(&self, slot: SlotRef) -> bool {
        self.generated.iter().any(|(s, _)| *s == slot)
    }

    pub(crate) fn suggest(&mut self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        if !self.suggestions.contains(&suggestion) {
            self.suggestions.push(suggestion);
        }
    }

    fn context(&self, slot: SlotRef) -> SlotContext {
        let classifier = self.classifier();
        let mut context = SlotContext::default();
        let previous = slot.date.pred_opt();

        if let Some(neighbor) = previous
            .and_then(|d| self.plan.slot(SlotRef::new(d, slot.meal_type)))
            .and_then(|s| self.resolve(&s.recipe_id))
        {
            context.neighbor_main = classifier.main_ingredient(neighbor);
            context.neighbor_cuisine = classifier.cuisine(neighbor);
        }

        if let Some(day) = self.plan.day(slot.date) {
            for (meal_type, meal_slot) in day.filled() {
                if meal_type == slot.meal_type {
                    continue;
                }
                let Some(recipe) = self.resolve(&meal_slot.recipe_id) else {
                    continue;
                };
                context.today_mains.extend(classifier.main_ingredient(recipe));
                context.nearby_ingredients.extend(recipe.ingredients.iter().cloned());
            }
        }

        if let Some(day) = previous.and_then(|d| self.plan.day(d)) {
            for (_, meal_slot) in day.filled() {
                if let Some(recipe) = self.resolve(&meal_slot.recipe_id) {
                    context.nearby_ingredients.extend(recipe.ingredients.iter().cloned());
                }
            }
        }

        context
    }

    fn score(&self, recipe: &Recipe, meal_type: MealType, target: f64, context: &SlotContext) -> f64 {
        let classifier = self.classifier();
        let main = classifier.main_ingredient(recipe);
        let cuisine = classifier.cuisine(recipe);

        let input = CostInput {
            calories: recipe.nutrition.calories,
            target_calories: target,
            is_exact_repeat: self.tracker.is_committed(&recipe.id),
            same_main_as_neighbor: main.is_some() && main == context.neighbor_main,
            same_cuisine_as_neighbor: cuisine.is_some() && cuisine == context.neighbor_cuisine,
            main_already_used_today: main
                .as_ref()
                .is_some_and(|m| context.today_mains.contains(m)),
            complexity: classifier.complexity(recipe),
            meal_type,
            batch_friendly: classifier.is_batch_friendly(recipe),
            ingredient_overlap: ingredient_overlap(
                recipe,
                context.nearby_ingredients.iter().map(String::as_str),
            ),
            weekly: self.weekly.then(|| WeeklyUsage {
                main_ingredient: self.tracker.main_count(main.as_deref()),
                cuisine: self.tracker.cuisine_count(cuisine.as_deref()),
            }),
        };

        cost(&input, &self.profile.preferences, &self.engine.settings.weights)
    }

    fn sources(&self, meal_type: MealType) -> Sources<'_> {
        Sources {
            primary: self
                .pools
                .get(&meal_type)
                .map(|p| p.as_slice())
                .unwrap_or_default(),
            local: &self.local,
            bundled: &self.engine.bundled,
        }
    }

    fn request<'a>(
        &'a self,
        meal_type: MealType,
        excluded: &'a HashSet<String>,
        require: Option<fn(&Recipe) -> bool>,
    ) -> SlotRequest<'a> {
        SlotRequest {
            meal_type,
            target_calories: meal_type.target_calories(self.profile.calorie_goal),
            filter: &self.filter,
            classifier: self.classifier(),
            policy: self.profile.preferences.uniqueness(),
            tracker: &self.tracker,
            excluded,
            require,
        }
    }

    fn pick(
        &self,
        slot: SlotRef,
        excluded: &HashSet<String>,
        require: Option<fn(&Recipe) -> bool>,
    ) -> Outcome {
        let target = slot.meal_type.target_calories(self.profile.calorie_goal);
        let context = self.context(slot);
        let sources = self.sources(slot.meal_type);
        let request = self.request(slot.meal_type, excluded, require);

        match cascade(&sources, &request, |r| {
            self.score(r, slot.meal_type, target, &context)
        }) {
            Some(pick) => Outcome::Picked(pick.recipe.clone(), pick.tier),
            None => {
                let classifier = self.classifier();
                Outcome::Exhausted(
                    self.filter.stats(
                        sources
                            .all()
                            .filter(|r| classifier.matches_meal_type(r, slot.meal_type)),
                    ),
                )
            }
        }
    }

    /// Runs the cascade for an empty slot, commits the pick and projects
    /// leftovers. Records a failure when every tier is exhausted.
    pub(crate) fn fill(&mut self, slot: SlotRef, excluded: &HashSet<String>) -> Option<Recipe> {
        let (recipe, tier) = match self.pick(slot, excluded, None) {
            Outcome::Picked(recipe, tier) => (recipe, tier),
            Outcome::Exhausted(stats) => {
                tracing::debug!(date = %slot.date, meal_type = %slot.meal_type, "slot unfillable");

                self.failures.push(SlotFailure {
                    date: slot.date,
                    meal_type: slot.meal_type,
                    stats,
                });
                self.suggest(format!(
                    "No {} recipe could be found for {}",
                    slot.meal_type, slot.date
                ));

                return None;
            }
        };

        if tier != Tier::Primary {
            tracing::debug!(
                date = %slot.date,
                meal_type = %slot.meal_type,
                tier = ?tier,
                recipe_id = %recipe.id,
                "slot filled from fallback tier"
            );
        }

        self.commit(slot, &recipe, &tier.tag(slot.meal_type));
        if let Some(note) = self.calorie_note(slot, &recipe) {
            self.suggest(note);
        }
        self.project(slot, &recipe);

        Some(recipe)
    }

    fn commit(&mut self, slot: SlotRef, recipe: &Recipe, label: &str) {
        let classifier = self.classifier();

        self.plan
            .day_mut(slot.date)
            .set(slot.meal_type, MealSlot::from_recipe(recipe));
        self.tracker.commit(recipe, classifier);
        self.record(slot, label);
    }

    fn calorie_note(&self, slot: SlotRef, recipe: &Recipe) -> Option<String> {
        let target = slot.meal_type.target_calories(self.profile.calorie_goal);
        let calories = recipe.nutrition.calories as f64;

        ((calories - target).abs() > target * CALORIE_TOLERANCE).then(|| {
            format!(
                "{} on {} ({}) has {} kcal, outside the {:.0} kcal target ±20%",
                slot.meal_type, slot.date, recipe.name, recipe.nutrition.calories, target
            )
        })
    }

    /// Reports a complete day whose total is more than 20% off the goal.
    pub(crate) fn check_day_total(&mut self, date: NaiveDate) {
        let Some(day) = self.plan.day(date) else {
            return;
        };

        if !day.is_complete() {
            return;
        }

        let goal = self.profile.calorie_goal as f64;
        let total = day.total_calories();

        if (total as f64 - goal).abs() > goal * CALORIE_TOLERANCE {
            self.suggest(format!(
                "{date} totals {total} kcal, more than 20% away from the {goal:.0} kcal goal"
            ));
        }
    }

    fn project(&mut self, source: SlotRef, recipe: &Recipe) {
        let projections = leftover::plan(
            &self.plan,
            source,
            recipe,
            &self.profile.preferences,
            self.classifier(),
            self.projection_end,
        );

        let labels = projections
            .iter()
            .map(|p| (p.target, p.kind()))
            .collect::<Vec<_>>();

        let written = leftover::apply(&mut self.plan, source, projections);

        for (target, kind) in labels {
            if !written.contains(&target) {
                continue;
            }
            let label = match kind {
                Some(kind) => format!("{}-{kind}", target.meal_type),
                None => target.meal_type.to_string(),
            };
            self.record(target, &label);
        }
    }

    /// Copies the breakfast at `source` onto the empty `target`.
    pub(crate) fn repeat(&mut self, source: SlotRef, target: SlotRef) -> bool {
        let Some(source_slot) = self.plan.slot(source) else {
            return false;
        };

        let projection = leftover::Projection {
            target,
            slot: source_slot.project(source, ProjectionKind::Repeat),
        };

        let written = leftover::apply(&mut self.plan, source, vec![projection]);
        if written.is_empty() {
            return false;
        }

        self.record(target, &format!("{}-{}", target.meal_type, ProjectionKind::Repeat));

        true
    }

    pub(crate) fn is_plant_based_slot(&self, meal_slot: &MealSlot) -> bool {
        self.resolve(&meal_slot.recipe_id)
            .is_some_and(|r| r.is_plant_based())
    }

    /// Plant-based candidate for `slot` from any source, ignoring the
    /// calorie window.
    fn pick_plant_based(&self, slot: SlotRef) -> Option<(Recipe, Tier)> {
        let target = slot.meal_type.target_calories(self.profile.calorie_goal);
        let context = self.context(slot);
        let excluded = HashSet::new();
        let sources = self.sources(slot.meal_type);
        let request = self.request(slot.meal_type, &excluded, Some(Recipe::is_plant_based));

        plant_based(&sources, &request, |r| {
            self.score(r, slot.meal_type, target, &context)
        })
        .map(|pick| (pick.recipe.clone(), pick.tier))
    }

    /// Replaces the generated slot with the best plant-based candidate. The
    /// regular cascade is tried first, without its absolute tier since that
    /// ignores diet and allergies.
    pub(crate) fn substitute_plant_based(&mut self, slot: SlotRef) -> bool {
        let classifier = self.classifier();
        let previous = self
            .plan
            .slot(slot)
            .and_then(|s| self.resolve(&s.recipe_id))
            .cloned();

        if let Some(previous) = &previous {
            self.tracker.release(previous, classifier);
        }

        let pick = match self.pick(slot, &HashSet::new(), Some(Recipe::is_plant_based)) {
            Outcome::Picked(recipe, tier) if tier != Tier::Absolute => Some((recipe, tier)),
            _ => self.pick_plant_based(slot),
        };

        let Some((recipe, tier)) = pick else {
            if let Some(previous) = &previous {
                self.tracker.commit(previous, classifier);
            }

            return false;
        };

        tracing::debug!(
            date = %slot.date,
            meal_type = %slot.meal_type,
            recipe_id = %recipe.id,
            tier = ?tier,
            "plant-based substitution"
        );

        if let Some(note) = previous.and_then(|p| self.calorie_note(slot, &p)) {
            self.suggestions.retain(|s| *s != note);
        }

        self.commit(slot, &recipe, &tier.tag(slot.meal_type));
        if let Some(note) = self.calorie_note(slot, &recipe) {
            self.suggest(note);
        }

        true
    }

    fn changed_days(&self) -> Vec<DailyMealPlan> {
        let dates = self
            .plan
            .days
            .keys()
            .chain(self.original.days.keys())
            .copied()
            .collect::<std::collections::BTreeSet<_>>();

        dates
            .into_iter()
            .filter(|date| self.plan.day(*date) != self.original.day(*date))
            .map(|date| {
                self.plan
                    .day(date)
                    .cloned()
                    .unwrap_or_else(|| DailyMealPlan::new(date))
            })
            .collect()
    }

    /// Persists changed days and builds the result. Progress always ends at 1.
    pub(crate) async fn finish(mut self) -> GenerationResult {
        let changed = self.changed_days();

        if !changed.is_empty()
            && let Err(err) = self.engine.store.save_days(&changed).await
        {
            tracing::error!(err = %err, days = changed.len(), "failed to save meal plan");
            self.progress.done();

            return GenerationResult::failed(
                "Failed to save the generated meal plan",
                vec!["Try again in a moment".to_owned()],
            );
        }

        let success = !self.generated.is_empty() || self.failures.is_empty();
        let error = if success {
            None
        } else {
            let mut stats = FilterStats::default();
            for failure in &self.failures {
                stats += failure.stats;
            }

            tracing::warn!(
                total = stats.total,
                after_diet = stats.after_diet,
                after_allergy = stats.after_allergy,
                "no meals could be generated"
            );

            if self.profile.diet_type != DietType::Any {
                self.suggest(format!(
                    "Consider relaxing your {} diet preference",
                    self.profile.diet_type
                ));
            }
            if stats.after_allergy < stats.after_diet || !self.filter.exclusions.is_empty() {
                self.suggest("Review your allergies and excluded ingredients");
            }
            self.suggest("Add more recipes to your collection");

            Some(total_failure_message(stats))
        };

        self.progress.done();

        GenerationResult {
            success,
            generated_meals: self.generated.into_iter().map(|(_, tag)| tag).collect(),
            error,
            suggestions: self.suggestions,
        }
    }
}
