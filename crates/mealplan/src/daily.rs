use std::collections::HashSet;

use chrono::NaiveDate;
use imkitchen_shared::mealplan::SlotRef;
use imkitchen_shared::recipe::{MealType, Recipe};

use crate::engine::{GenerationEngine, GenerationPhase};
use crate::leftover;
use crate::result::GenerationResult;
use crate::run::{Run, add_days, iso_week, sub_days};

enum Mode {
    Fill(Option<MealType>),
    Regenerate,
}

impl GenerationEngine {
    /// Fills `meal_type` on `date`, replacing a non-leftover slot already
    /// there, or every empty slot of the day when `meal_type` is `None`.
    /// `fallback_recipes` are tried with the local repository.
    #[tracing::instrument(skip(self, fallback_recipes))]
    pub async fn generate_meal_plan(
        &self,
        date: NaiveDate,
        fallback_recipes: &[Recipe],
        meal_type: Option<MealType>,
    ) -> GenerationResult {
        let _guard = self.run_lock.lock().await;

        self.run_day(date, fallback_recipes, Mode::Fill(meal_type))
            .await
    }

    pub async fn generate_all_meals_for_day(
        &self,
        date: NaiveDate,
        fallback_recipes: &[Recipe],
    ) -> GenerationResult {
        self.generate_meal_plan(date, fallback_recipes, None).await
    }

    /// Clears every slot of `date` that is not a leftover of another day,
    /// together with the leftovers projected from them, then fills the day.
    #[tracing::instrument(skip(self, fallback_recipes))]
    pub async fn regenerate_day(
        &self,
        date: NaiveDate,
        fallback_recipes: &[Recipe],
    ) -> GenerationResult {
        let _guard = self.run_lock.lock().await;

        self.run_day(date, fallback_recipes, Mode::Regenerate).await
    }

    async fn run_day(
        &self,
        date: NaiveDate,
        fallback_recipes: &[Recipe],
        mode: Mode,
    ) -> GenerationResult {
        let profile = self.profiles.profile();
        let gap = if profile.preferences.plan_leftovers {
            u64::from(profile.preferences.leftover_gap_days())
        } else {
            0
        };

        let (week_start, week_end) = iso_week(date);
        let projection_end = add_days(date, gap);
        let seed_end = week_end.max(projection_end);

        let meal_types = match mode {
            Mode::Fill(Some(meal_type)) => vec![meal_type],
            _ => MealType::ALL.to_vec(),
        };

        let mut run = match Run::prepare(
            self,
            fallback_recipes,
            &meal_types,
            sub_days(week_start, 1),
            seed_end,
            Some(date),
        )
        .await
        {
            Ok(run) => run,
            Err(result) => return result,
        };
        run.projection_end = projection_end;

        let mut targets = vec![];
        for meal_type in &meal_types {
            let slot = SlotRef::new(date, *meal_type);
            let linked = run.plan.slot(slot).map(|s| s.leftover_source.clone());

            match (linked, &mode) {
                (None, _) => targets.push(slot),
                (Some(Some(source)), Mode::Fill(Some(_))) => {
                    run.suggest(format!(
                        "{} on {} is a leftover of {} {}; regenerate that meal instead",
                        meal_type, date, source.source_date, source.source_meal_type
                    ));
                }
                (Some(Some(_)), _) => {}
                (Some(None), Mode::Fill(None)) => {}
                (Some(None), _) => {
                    leftover::clear_projections(&mut run.plan, slot);
                    run.plan.day_mut(date).take(*meal_type);
                    targets.push(slot);
                }
            }
        }

        run.seed(week_start, seed_end);
        run.progress.report(GenerationPhase::AssigningSlots, 0.4);

        let step = 0.55 / targets.len().max(1) as f32;
        let none = HashSet::new();
        for (i, slot) in targets.iter().enumerate() {
            if run.plan.is_empty_slot(*slot) {
                run.fill(*slot, &none);
            }
            run.progress
                .report(GenerationPhase::AssigningSlots, 0.4 + step * (i + 1) as f32);
        }

        run.check_day_total(date);

        run.finish().await
    }
}
