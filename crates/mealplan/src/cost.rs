//! Candidate scoring. Lower is better.
//!
//! The score is `|calories - target|` plus a fixed set of named penalties
//! (and a few bonuses) from [`Weights`]. Every term is independent so each can
//! be tuned and tested in isolation.

use imkitchen_shared::recipe::{Complexity, MealType, Recipe};
use imkitchen_shared::user::GenerationPreferences;

/// Penalty table. Positive values push a candidate down the ranking,
/// negative values are bonuses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub exact_repeat: f64,
    pub same_main_as_neighbor: f64,
    pub same_cuisine_as_neighbor: f64,
    pub main_used_today: f64,
    pub complex_disallowed: f64,
    pub complex_breakfast: f64,
    pub complex_other: f64,
    pub intermediate_breakfast: f64,
    pub intermediate_other: f64,
    pub simple_preferred: f64,
    pub simple_breakfast_strong_bias: f64,
    /// Weekly mode, multiplied by how often the main ingredient was used.
    pub weekly_main_usage: f64,
    /// Weekly mode, multiplied by how often the cuisine was used.
    pub weekly_cuisine_usage: f64,
    pub batch_friendly: f64,
    /// Scaled by ingredient overlap ratio in `[0, 1]`.
    pub ingredient_overlap: f64,
}

impl Weights {
    pub const DEFAULT: Weights = Weights {
        exact_repeat: 1000.0,
        same_main_as_neighbor: 60.0,
        same_cuisine_as_neighbor: 30.0,
        main_used_today: 20.0,
        complex_disallowed: 1000.0,
        complex_breakfast: 120.0,
        complex_other: 40.0,
        intermediate_breakfast: 20.0,
        intermediate_other: 8.0,
        simple_preferred: -10.0,
        simple_breakfast_strong_bias: -20.0,
        weekly_main_usage: 20.0,
        weekly_cuisine_usage: 10.0,
        batch_friendly: -25.0,
        ingredient_overlap: -20.0,
    };
}

impl Default for Weights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WeeklyUsage {
    pub main_ingredient: u32,
    pub cuisine: u32,
}

/// Everything the cost function looks at, precomputed by the caller.
#[derive(Clone, Copy, Debug)]
pub struct CostInput {
    pub calories: u32,
    pub target_calories: f64,
    pub is_exact_repeat: bool,
    pub same_main_as_neighbor: bool,
    pub same_cuisine_as_neighbor: bool,
    pub main_already_used_today: bool,
    pub complexity: Complexity,
    pub meal_type: MealType,
    pub batch_friendly: bool,
    /// Share of the candidate's ingredients already bought for nearby picks.
    pub ingredient_overlap: f64,
    pub weekly: Option<WeeklyUsage>,
}

pub fn cost(input: &CostInput, preferences: &GenerationPreferences, weights: &Weights) -> f64 {
    let breakfast = input.meal_type == MealType::Breakfast;
    let mut score = (input.calories as f64 - input.target_calories).abs();

    if input.is_exact_repeat {
        score += weights.exact_repeat;
    }
    if input.same_main_as_neighbor {
        score += weights.same_main_as_neighbor;
    }
    if input.same_cuisine_as_neighbor {
        score += weights.same_cuisine_as_neighbor;
    }
    if input.main_already_used_today {
        score += weights.main_used_today;
    }

    score += match input.complexity {
        Complexity::Complex if preferences.disallow_complex => weights.complex_disallowed,
        Complexity::Complex if breakfast => weights.complex_breakfast,
        Complexity::Complex => weights.complex_other,
        Complexity::Intermediate if breakfast => weights.intermediate_breakfast,
        Complexity::Intermediate => weights.intermediate_other,
        Complexity::Simple => {
            let mut bonus = 0.0;
            if preferences.prefer_simple {
                bonus += weights.simple_preferred;
            }
            if breakfast && preferences.strong_simple_breakfast_bias {
                bonus += weights.simple_breakfast_strong_bias;
            }
            bonus
        }
    };

    if let Some(weekly) = input.weekly {
        score += weekly.main_ingredient as f64 * weights.weekly_main_usage;
        score += weekly.cuisine as f64 * weights.weekly_cuisine_usage;
    }

    if preferences.prefer_batch_prep {
        if input.batch_friendly {
            score += weights.batch_friendly;
        }
        score += input.ingredient_overlap.clamp(0.0, 1.0) * weights.ingredient_overlap;
    }

    score
}

/// Fraction of `candidate`'s ingredient lines that also appear (lowercased,
/// trimmed) among `others`.
pub fn ingredient_overlap<'a>(
    candidate: &Recipe,
    others: impl IntoIterator<Item = &'a str>,
) -> f64 {
    if candidate.ingredients.is_empty() {
        return 0.0;
    }

    let others = others
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .collect::<std::collections::HashSet<_>>();

    let shared = candidate
        .ingredients
        .iter()
        .filter(|i| others.contains(&i.trim().to_lowercase()))
        .count();

    shared as f64 / candidate.ingredients.len() as f64
}

#[derive(Clone, Debug)]
pub struct Selection<'a> {
    pub recipe: &'a Recipe,
    pub cost: f64,
}

/// Lowest-cost candidate; ties keep pool order.
pub fn select_best<'a, F>(candidates: &[&'a Recipe], mut score: F) -> Option<Selection<'a>>
where
    F: FnMut(&Recipe) -> f64,
{
    rank(candidates, &mut score).into_iter().next()
}

/// All candidates sorted ascending by cost, stable on ties.
pub fn rank<'a, F>(candidates: &[&'a Recipe], mut score: F) -> Vec<Selection<'a>>
where
    F: FnMut(&Recipe) -> f64,
{
    let mut ranked = candidates
        .iter()
        .map(|recipe| Selection {
            recipe,
            cost: score(recipe),
        })
        .collect::<Vec<_>>();

    ranked.sort_by(|a, b| a.cost.total_cmp(&b.cost));

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(calories: u32, meal_type: MealType) -> CostInput {
        CostInput {
            calories,
            target_calories: 600.0,
            is_exact_repeat: false,
            same_main_as_neighbor: false,
            same_cuisine_as_neighbor: false,
            main_already_used_today: false,
            complexity: Complexity::Simple,
            meal_type,
            batch_friendly: false,
            ingredient_overlap: 0.0,
            weekly: None,
        }
    }

    fn score(input: &CostInput, preferences: &GenerationPreferences) -> f64 {
        cost(input, preferences, &Weights::DEFAULT)
    }

    #[test]
    fn test_base_term_is_calorie_distance() {
        let prefs = GenerationPreferences::default();

        assert_eq!(score(&input(600, MealType::Lunch), &prefs), 0.0);
        assert_eq!(score(&input(550, MealType::Lunch), &prefs), 50.0);
        assert_eq!(score(&input(700, MealType::Lunch), &prefs), 100.0);
    }

    #[test]
    fn test_variety_penalties_stack() {
        let prefs = GenerationPreferences::default();
        let mut i = input(600, MealType::Dinner);
        i.is_exact_repeat = true;
        i.same_main_as_neighbor = true;
        i.same_cuisine_as_neighbor = true;
        i.main_already_used_today = true;

        assert_eq!(score(&i, &prefs), 1000.0 + 60.0 + 30.0 + 20.0);
    }

    #[test]
    fn test_complexity_penalties() {
        let mut prefs = GenerationPreferences::default();
        let mut breakfast = input(600, MealType::Breakfast);
        let mut dinner = input(600, MealType::Dinner);

        breakfast.complexity = Complexity::Complex;
        dinner.complexity = Complexity::Complex;
        assert_eq!(score(&breakfast, &prefs), 120.0);
        assert_eq!(score(&dinner, &prefs), 40.0);

        breakfast.complexity = Complexity::Intermediate;
        dinner.complexity = Complexity::Intermediate;
        assert_eq!(score(&breakfast, &prefs), 20.0);
        assert_eq!(score(&dinner, &prefs), 8.0);

        prefs.disallow_complex = true;
        dinner.complexity = Complexity::Complex;
        assert_eq!(score(&dinner, &prefs), 1000.0);
    }

    #[test]
    fn test_simple_bonuses() {
        let mut prefs = GenerationPreferences::default();
        let breakfast = input(600, MealType::Breakfast);
        let lunch = input(600, MealType::Lunch);

        assert_eq!(score(&breakfast, &prefs), 0.0);

        prefs.prefer_simple = true;
        assert_eq!(score(&lunch, &prefs), -10.0);

        prefs.strong_simple_breakfast_bias = true;
        assert_eq!(score(&breakfast, &prefs), -30.0);
        assert_eq!(score(&lunch, &prefs), -10.0);
    }

    #[test]
    fn test_weekly_usage_and_batch_bonus() {
        let mut prefs = GenerationPreferences::default();
        let mut i = input(600, MealType::Dinner);
        i.weekly = Some(WeeklyUsage {
            main_ingredient: 2,
            cuisine: 3,
        });
        i.batch_friendly = true;
        i.ingredient_overlap = 0.5;

        assert_eq!(score(&i, &prefs), 40.0 + 30.0);

        prefs.prefer_batch_prep = true;
        assert_eq!(score(&i, &prefs), 70.0 - 25.0 - 10.0);
    }

    #[test]
    fn test_ingredient_overlap() {
        let recipe = Recipe::new("1", "Bowl").ingredients(["Rice", "black beans", "salsa", "lime"]);

        assert_eq!(ingredient_overlap(&recipe, ["rice ", "LIME", "onion"]), 0.5);
        assert_eq!(ingredient_overlap(&Recipe::new("2", "Empty"), ["rice"]), 0.0);
    }

    #[test]
    fn test_select_best_is_stable_on_ties() {
        let a = Recipe::new("a", "A").calories(500);
        let b = Recipe::new("b", "B").calories(700);
        let c = Recipe::new("c", "C").calories(650);
        let candidates = vec![&a, &b, &c];

        let best = select_best(&candidates, |r| (r.nutrition.calories as f64 - 600.0).abs());
        assert_eq!(best.map(|s| s.recipe.id.as_str()), Some("c"));

        let tie = select_best(&candidates, |_| 1.0);
        assert_eq!(tie.map(|s| s.recipe.id.as_str()), Some("a"));

        assert!(select_best(&[], |_| 0.0).is_none());
    }
}
