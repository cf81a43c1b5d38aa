use std::collections::HashSet;

use chrono::NaiveDate;
use imkitchen_shared::mealplan::SlotRef;
use imkitchen_shared::recipe::MealType;
use imkitchen_shared::user::BreakfastRepeatMode;

use crate::engine::{GenerationEngine, GenerationPhase};
use crate::result::GenerationResult;
use crate::run::{Run, sub_days};

/// Days one repeated breakfast is held for.
pub const REPEAT_BLOCK_DAYS: usize = 3;

/// Plant-based substitution order.
const PLANT_BASED_ORDER: [MealType; 3] = [MealType::Dinner, MealType::Lunch, MealType::Breakfast];

/// Breakfast assignment state across the window.
#[derive(Default)]
struct Breakfasts {
    /// Repeat mode: block index and the slot the block copies from.
    block: Option<(usize, SlotRef)>,
    previous_pick: Option<String>,
    /// Alternate mode: source slot and recipe per day parity.
    alternates: [Option<(SlotRef, String)>; 2],
}

impl Breakfasts {
    fn assign(&mut self, run: &mut Run, mode: BreakfastRepeatMode, index: usize, date: NaiveDate) {
        let slot = SlotRef::new(date, MealType::Breakfast);
        if !run.plan.is_empty_slot(slot) {
            return;
        }

        match mode {
            BreakfastRepeatMode::NoRepeat => {
                run.fill(slot, &HashSet::new());
            }
            BreakfastRepeatMode::Repeat => {
                let block = index / REPEAT_BLOCK_DAYS;

                if let Some((current, source)) = self.block
                    && current == block
                    && run.repeat(source, slot)
                {
                    return;
                }

                let excluded = self.previous_pick.iter().cloned().collect::<HashSet<_>>();
                if let Some(recipe) = run.fill(slot, &excluded) {
                    self.block = Some((block, slot));
                    self.previous_pick = Some(recipe.id);
                }
            }
            BreakfastRepeatMode::Alternate => {
                let parity = index % 2;

                if let Some((source, _)) = &self.alternates[parity]
                    && run.repeat(*source, slot)
                {
                    return;
                }

                let excluded = self.alternates[1 - parity]
                    .iter()
                    .map(|(_, id)| id.to_owned())
                    .collect::<HashSet<_>>();
                if let Some(recipe) = run.fill(slot, &excluded) {
                    self.alternates[parity] = Some((slot, recipe.id));
                }
            }
        }
    }
}

impl GenerationEngine {
    /// Fills every empty slot in `start..=end`, sharing one variety tracker
    /// across the window.
    #[tracing::instrument(skip(self))]
    pub async fn generate_weekly_meal_plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> GenerationResult {
        let _guard = self.run_lock.lock().await;

        if end < start {
            return GenerationResult::failed(
                format!("End date {end} is before start date {start}"),
                vec![],
            );
        }

        let mut run = match Run::prepare(
            self,
            &[],
            &MealType::ALL,
            sub_days(start, 1),
            end,
            None,
        )
        .await
        {
            Ok(run) => run.weekly(),
            Err(result) => return result,
        };

        run.seed(start, end);
        run.progress.report(GenerationPhase::AssigningSlots, 0.4);

        let dates = start.iter_days().take_while(|d| *d <= end).collect::<Vec<_>>();
        let mode = run.profile.preferences.breakfast_repeat;
        let step = 0.45 / (dates.len() * MealType::ALL.len()).max(1) as f32;
        let none = HashSet::new();
        let mut breakfasts = Breakfasts::default();
        let mut done = 0;

        for (index, date) in dates.iter().enumerate() {
            breakfasts.assign(&mut run, mode, index, *date);
            done += 1;
            run.progress
                .report(GenerationPhase::AssigningSlots, 0.4 + step * done as f32);

            for meal_type in [MealType::Lunch, MealType::Dinner] {
                let slot = SlotRef::new(*date, meal_type);
                if run.plan.is_empty_slot(slot) {
                    run.fill(slot, &none);
                }
                done += 1;
                run.progress
                    .report(GenerationPhase::AssigningSlots, 0.4 + step * done as f32);
            }
        }

        if run.profile.preferences.require_daily_plant_based {
            run.progress.report(GenerationPhase::PlantBasedCheck, 0.9);
            ensure_plant_based(&mut run, &dates);
        }

        for date in &dates {
            run.check_day_total(*date);
        }

        run.finish().await
    }
}

/// Every day with generated meals gets at least one vegetarian or vegan slot
/// when a suitable recipe exists in any source; otherwise a suggestion is
/// recorded.
fn ensure_plant_based(run: &mut Run, dates: &[NaiveDate]) {
    for date in dates {
        let generated_today = MealType::ALL
            .into_iter()
            .any(|meal_type| run.was_generated(SlotRef::new(*date, meal_type)));
        let Some(day) = run.plan.day(*date) else {
            continue;
        };

        if !generated_today {
            continue;
        }

        if day.filled().any(|(_, slot)| run.is_plant_based_slot(slot)) {
            continue;
        }

        let replaceable = PLANT_BASED_ORDER
            .into_iter()
            .map(|meal_type| SlotRef::new(*date, meal_type))
            .filter(|slot| run.was_generated(*slot))
            .filter(|slot| {
                run.plan
                    .slot(*slot)
                    .is_some_and(|s| !s.is_linked() && s.projected_to.is_empty())
            })
            .collect::<Vec<_>>();

        if replaceable.is_empty() {
            run.suggest(format!(
                "{date} has no vegetarian or vegan meal and its generated slots are tied to leftovers"
            ));
            continue;
        }

        let substituted = replaceable
            .into_iter()
            .any(|slot| run.substitute_plant_based(slot));

        if !substituted {
            tracing::debug!(date = %date, "no plant-based candidate");
            run.suggest(format!(
                "No vegetarian or vegan recipe was available for {date}; add plant-based recipes to cover every day"
            ));
        }
    }
}
