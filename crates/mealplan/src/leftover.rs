//! Leftover and make-ahead projection.
//!
//! [`plan`] is pure: it inspects the plan and returns the projections it
//! would make. [`apply`] folds them into the plan and annotates the source.

use chrono::{Days, NaiveDate};
use imkitchen_shared::mealplan::{MealSlot, ProjectionKind, SlotRef, WeekPlan};
use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::{BreakfastRepeatMode, GenerationPreferences};

use crate::classifier::Classifier;

/// Most mornings a make-ahead breakfast is copied onto.
pub const MAX_MAKE_AHEAD_COPIES: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    pub target: SlotRef,
    pub slot: MealSlot,
}

impl Projection {
    pub fn kind(&self) -> Option<ProjectionKind> {
        self.slot.leftover_source.as_ref().map(|s| s.kind)
    }
}

/// Projections for a freshly committed `source` slot. Only empty slots in
/// `(source.date, min(source.date + gap, horizon_end)]` are considered.
pub fn plan(
    week: &WeekPlan,
    source: SlotRef,
    recipe: &Recipe,
    preferences: &GenerationPreferences,
    classifier: &dyn Classifier,
    horizon_end: NaiveDate,
) -> Vec<Projection> {
    if !preferences.plan_leftovers || !classifier.is_batch_friendly(recipe) {
        return vec![];
    }

    let Some(source_slot) = week.slot(source) else {
        return vec![];
    };

    let (target_meal, kind, max) = match source.meal_type {
        MealType::Dinner => (MealType::Lunch, ProjectionKind::Leftover, 1),
        MealType::Breakfast if preferences.breakfast_repeat == BreakfastRepeatMode::NoRepeat => {
            (
                MealType::Breakfast,
                ProjectionKind::MakeAhead,
                MAX_MAKE_AHEAD_COPIES,
            )
        }
        _ => return vec![],
    };

    let gap = u64::from(preferences.leftover_gap_days());

    (1..=gap)
        .filter_map(|offset| source.date.checked_add_days(Days::new(offset)))
        .take_while(|date| *date <= horizon_end)
        .map(|date| SlotRef::new(date, target_meal))
        .filter(|target| week.is_empty_slot(*target))
        .take(max)
        .map(|target| {
            let mut slot = source_slot.project(source, kind);
            if kind == ProjectionKind::Leftover {
                slot.repurpose_suggestion = Some(classifier.repurpose_suggestion(recipe));
            }

            Projection { target, slot }
        })
        .collect()
}

/// Writes `projections` into `week`, never over an occupied slot, and records
/// the targets on the source. Returns the targets actually written.
pub fn apply(week: &mut WeekPlan, source: SlotRef, projections: Vec<Projection>) -> Vec<SlotRef> {
    let mut written = vec![];
    let batch = projections
        .iter()
        .any(|p| p.kind() != Some(ProjectionKind::Repeat));

    for projection in projections {
        if !week.is_empty_slot(projection.target) {
            continue;
        }

        week.day_mut(projection.target.date)
            .set(projection.target.meal_type, projection.slot);
        written.push(projection.target);
    }

    if let Some(source_slot) = week.slot_mut(source)
        && !written.is_empty()
    {
        source_slot.batch_prep |= batch;
        source_slot.projected_to.extend(written.iter().copied());
    }

    written
}

/// Removes every slot projected from `source`. Returns the cleared targets.
pub fn clear_projections(week: &mut WeekPlan, source: SlotRef) -> Vec<SlotRef> {
    let targets = week
        .slots()
        .filter(|(_, slot)| {
            slot.leftover_source.as_ref().is_some_and(|s| {
                s.source_date == source.date && s.source_meal_type == source.meal_type
            })
        })
        .map(|(target, _)| target)
        .collect::<Vec<_>>();

    for target in &targets {
        week.day_mut(target.date).take(target.meal_type);
    }

    targets
}
