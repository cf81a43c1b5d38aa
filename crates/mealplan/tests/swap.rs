use std::collections::HashSet;

use chrono::Days;
use imkitchen_mealplan::WeekPlanStore;
use imkitchen_shared::mealplan::{DailyMealPlan, MealSlot, ProjectionKind, SlotRef};
use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::UserDietaryProfile;

mod helpers;

use helpers::Harness;

async fn planned_week() -> anyhow::Result<Harness> {
    let harness = Harness::new(helpers::pool(), UserDietaryProfile::default());
    let start = helpers::monday();

    let result = harness
        .engine
        .generate_weekly_meal_plan(start, start + Days::new(6))
        .await;
    anyhow::ensure!(result.success, "week generation failed: {:?}", result.error);

    Ok(harness)
}

async fn unused_main(harness: &Harness) -> String {
    let used = harness
        .plan()
        .await
        .slots()
        .map(|(_, s)| s.recipe_id.to_owned())
        .collect::<HashSet<_>>();

    helpers::mains(20)
        .into_iter()
        .map(|r| r.id)
        .find(|id| !used.contains(id))
        .unwrap()
}

#[tokio::test]
async fn test_swap_rejects_recipe_used_elsewhere() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let monday = helpers::monday();
    let plan = harness.plan().await;
    let tuesday_dinner = plan
        .slot(SlotRef::new(monday + Days::new(1), MealType::Dinner))
        .unwrap()
        .recipe_id
        .to_owned();
    let before = serde_json::to_string(&plan)?;

    let swapped = harness
        .engine
        .swap_meal(monday, MealType::Lunch, &tuesday_dinner)
        .await;

    assert!(!swapped);
    assert_eq!(serde_json::to_string(&harness.plan().await)?, before);

    Ok(())
}

#[tokio::test]
async fn test_swap_keeps_servings() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let monday = helpers::monday();
    let target = SlotRef::new(monday, MealType::Lunch);

    let mut day = harness.plan().await.day(monday).cloned().unwrap();
    day.lunch.as_mut().unwrap().set_servings(4)?;
    harness.store.save_days(&[day]).await?;

    let replacement = unused_main(&harness).await;
    let swapped = harness
        .engine
        .swap_meal(monday, MealType::Lunch, &replacement)
        .await;

    assert!(swapped);

    let plan = harness.plan().await;
    let slot = plan.slot(target).unwrap();
    assert_eq!(slot.recipe_id, replacement);
    assert_eq!(slot.servings, 4);
    assert!(!slot.is_linked());
    assert!(plan.day(monday).unwrap().is_complete());

    Ok(())
}

#[tokio::test]
async fn test_swap_same_recipe_is_noop() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let monday = helpers::monday();
    let before = harness.plan().await;
    let current = before
        .slot(SlotRef::new(monday, MealType::Dinner))
        .unwrap()
        .recipe_id
        .to_owned();

    assert!(
        harness
            .engine
            .swap_meal(monday, MealType::Dinner, &current)
            .await
    );
    assert_eq!(harness.plan().await, before);

    Ok(())
}

#[tokio::test]
async fn test_swap_rejects_unknown_and_ineligible() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let monday = helpers::monday();
    let before = harness.plan().await;

    assert!(
        !harness
            .engine
            .swap_meal(monday, MealType::Lunch, "does-not-exist")
            .await
    );

    // Breakfast-typed recipes never go into a dinner slot.
    let breakfast = helpers::breakfasts(10)
        .into_iter()
        .map(|r| r.id)
        .find(|id| before.slots().all(|(_, s)| &s.recipe_id != id))
        .unwrap();
    assert!(
        !harness
            .engine
            .swap_meal(monday, MealType::Dinner, &breakfast)
            .await
    );

    assert_eq!(harness.plan().await, before);

    Ok(())
}

#[tokio::test]
async fn test_swap_rejects_empty_slot() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let next_monday = helpers::monday() + Days::new(7);
    let replacement = unused_main(&harness).await;

    assert!(
        !harness
            .engine
            .swap_meal(next_monday, MealType::Lunch, &replacement)
            .await
    );
    assert!(harness.plan().await.day(next_monday).is_none());

    Ok(())
}

async fn stew_with_leftover(harness: &Harness) -> anyhow::Result<(SlotRef, SlotRef)> {
    let monday = helpers::monday();
    let source = SlotRef::new(monday, MealType::Dinner);
    let target = SlotRef::new(monday + Days::new(1), MealType::Lunch);

    let mut dinner = MealSlot::from_recipe(&Recipe::new("stew", "Lamb Stew").calories(700));
    let lunch = dinner.project(source, ProjectionKind::Leftover);
    dinner.projected_to.push(target);

    let mut first = DailyMealPlan::new(source.date);
    first.set(MealType::Dinner, dinner);
    let mut second = DailyMealPlan::new(target.date);
    second.set(MealType::Lunch, lunch);
    harness.store.save_days(&[first, second]).await?;

    Ok((source, target))
}

#[tokio::test]
async fn test_swap_source_removes_its_leftovers() -> anyhow::Result<()> {
    let harness = Harness::new(helpers::pool(), UserDietaryProfile::default());
    let (source, target) = stew_with_leftover(&harness).await?;

    assert!(
        harness
            .engine
            .swap_meal(source.date, source.meal_type, "main-1")
            .await
    );

    let plan = harness.plan().await;
    let dinner = plan.slot(source).unwrap();
    assert_eq!(dinner.recipe_id, "main-1");
    assert!(dinner.projected_to.is_empty());
    assert!(plan.day(target.date).is_none());

    Ok(())
}

#[tokio::test]
async fn test_swap_leftover_detaches_from_source() -> anyhow::Result<()> {
    let harness = Harness::new(helpers::pool(), UserDietaryProfile::default());
    let (source, target) = stew_with_leftover(&harness).await?;

    assert!(
        harness
            .engine
            .swap_meal(target.date, target.meal_type, "main-1")
            .await
    );

    let plan = harness.plan().await;
    let lunch = plan.slot(target).unwrap();
    assert_eq!(lunch.recipe_id, "main-1");
    assert!(!lunch.is_linked());

    let dinner = plan.slot(source).unwrap();
    assert_eq!(dinner.recipe_id, "stew");
    assert!(dinner.projected_to.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_swap_leftover_to_same_or_unknown_recipe() -> anyhow::Result<()> {
    let harness = Harness::new(helpers::pool(), UserDietaryProfile::default());
    let (_, target) = stew_with_leftover(&harness).await?;
    let before = harness.plan().await;

    assert!(
        harness
            .engine
            .swap_meal(target.date, target.meal_type, "stew")
            .await
    );
    assert!(
        !harness
            .engine
            .swap_meal(target.date, target.meal_type, "unknown")
            .await
    );
    assert_eq!(harness.plan().await, before);

    Ok(())
}

#[tokio::test]
async fn test_alternatives_skip_week_recipes() -> anyhow::Result<()> {
    let harness = planned_week().await?;
    let monday = helpers::monday();
    let plan = harness.plan().await;
    let current = plan
        .slot(SlotRef::new(monday, MealType::Lunch))
        .unwrap()
        .recipe_id
        .to_owned();
    let used = plan
        .slots()
        .map(|(_, s)| s.recipe_id.to_owned())
        .collect::<HashSet<_>>();

    let alternatives = harness
        .engine
        .get_alternative_recipes(monday, MealType::Lunch, &current)
        .await;

    assert_eq!(alternatives.len(), 5);
    assert!(alternatives.iter().all(|r| !used.contains(&r.id)));
    assert!(alternatives.iter().all(|r| r.meal_type != Some(MealType::Breakfast)));

    let ids = alternatives.iter().map(|r| &r.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), alternatives.len());

    Ok(())
}
