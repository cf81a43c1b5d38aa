//! Tiered candidate sources for one slot.
//!
//! Tiers are tried in order and the first one with any eligible candidate
//! wins. The winning tier is reported so callers can see degradation.

use std::collections::HashSet;

use imkitchen_shared::recipe::{MealType, Recipe};
use imkitchen_shared::user::UniquenessPolicy;

use crate::classifier::Classifier;
use crate::cost::select_best;
use crate::suitability::SuitabilityFilter;
use crate::variety::VarietyTracker;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Primary pool, every constraint applied.
    Primary,
    /// Primary pool without the uniqueness constraint.
    PrimaryRelaxed,
    /// Caller-supplied and local repository recipes, wider calorie window.
    Local,
    /// Bundled default dataset.
    Bundled,
    /// First candidate of the right meal type from anywhere.
    Absolute,
    /// Suitable vegetarian or vegan recipe from anywhere, any calories.
    /// Only used to guarantee a plant-based meal per day.
    PlantBased,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Primary,
        Tier::PrimaryRelaxed,
        Tier::Local,
        Tier::Bundled,
        Tier::Absolute,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            Tier::Primary => "",
            Tier::PrimaryRelaxed => "-relaxed",
            Tier::Local => "-local",
            Tier::Bundled => "-fallback",
            Tier::Absolute => "-absolute",
            Tier::PlantBased => "-plant-based",
        }
    }

    pub fn tag(&self, meal_type: MealType) -> String {
        format!("{meal_type}{}", self.suffix())
    }

    /// Allowed relative distance from the calorie target.
    pub fn calorie_tolerance(&self) -> Option<f64> {
        match self {
            Tier::Primary | Tier::PrimaryRelaxed => Some(0.20),
            Tier::Local | Tier::Bundled => Some(0.40),
            Tier::Absolute | Tier::PlantBased => None,
        }
    }

    fn enforces_uniqueness(&self, policy: UniquenessPolicy) -> bool {
        match (self, policy) {
            (_, UniquenessPolicy::Off)
            | (Tier::Absolute | Tier::PrimaryRelaxed | Tier::PlantBased, _) => false,
            (Tier::Primary, _) => true,
            (Tier::Local | Tier::Bundled, policy) => policy == UniquenessPolicy::Strict,
        }
    }

    fn is_skipped(&self, policy: UniquenessPolicy) -> bool {
        // Relaxing uniqueness is pointless when it is off, and forbidden when strict.
        *self == Tier::PrimaryRelaxed && policy != UniquenessPolicy::PreferUnique
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Sources<'a> {
    pub primary: &'a [Recipe],
    pub local: &'a [Recipe],
    pub bundled: &'a [Recipe],
}

impl<'a> Sources<'a> {
    fn for_tier(&self, tier: Tier) -> Box<dyn Iterator<Item = &'a Recipe> + 'a> {
        match tier {
            Tier::Primary | Tier::PrimaryRelaxed => Box::new(self.primary.iter()),
            Tier::Local => Box::new(self.local.iter()),
            Tier::Bundled => Box::new(self.bundled.iter()),
            Tier::Absolute | Tier::PlantBased => Box::new(
                self.primary
                    .iter()
                    .chain(self.local.iter())
                    .chain(self.bundled.iter()),
            ),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &'a Recipe> {
        self.primary
            .iter()
            .chain(self.local.iter())
            .chain(self.bundled.iter())
    }
}

/// Constraints for one slot.
pub struct SlotRequest<'a> {
    pub meal_type: MealType,
    pub target_calories: f64,
    pub filter: &'a SuitabilityFilter,
    pub classifier: &'a dyn Classifier,
    pub policy: UniquenessPolicy,
    pub tracker: &'a VarietyTracker,
    /// Ids rejected on every tier but the absolute one.
    pub excluded: &'a HashSet<String>,
    /// Extra requirement applied on every tier, absolute included.
    pub require: Option<fn(&Recipe) -> bool>,
}

impl SlotRequest<'_> {
    fn within_calories(&self, recipe: &Recipe, tolerance: f64) -> bool {
        let delta = (recipe.nutrition.calories as f64 - self.target_calories).abs();

        delta <= self.target_calories * tolerance
    }

    fn accepts(&self, tier: Tier, recipe: &Recipe) -> bool {
        if !self.classifier.matches_meal_type(recipe, self.meal_type) {
            return false;
        }

        if self.require.is_some_and(|require| !require(recipe)) {
            return false;
        }

        if tier == Tier::Absolute {
            return true;
        }

        if self.excluded.contains(&recipe.id) {
            return false;
        }

        if tier.enforces_uniqueness(self.policy) && self.tracker.is_committed(&recipe.id) {
            return false;
        }

        if let Some(tolerance) = tier.calorie_tolerance()
            && !self.within_calories(recipe, tolerance)
        {
            return false;
        }

        self.filter.is_suitable(recipe, self.classifier)
    }
}

/// Eligible candidates for `tier`, in source order, duplicates removed.
pub fn candidates<'a>(tier: Tier, sources: &Sources<'a>, request: &SlotRequest) -> Vec<&'a Recipe> {
    if tier.is_skipped(request.policy) {
        return vec![];
    }

    let mut seen = HashSet::new();

    sources
        .for_tier(tier)
        .filter(|recipe| request.accepts(tier, recipe))
        .filter(|recipe| seen.insert(recipe.id.as_str()))
        .collect()
}

#[derive(Clone, Debug)]
pub struct Pick<'a> {
    pub recipe: &'a Recipe,
    pub tier: Tier,
    pub cost: f64,
}

/// Walks the tiers and returns the best candidate of the first non-empty one.
/// The absolute tier takes its first candidate without scoring.
pub fn cascade<'a, F>(sources: &Sources<'a>, request: &SlotRequest, mut score: F) -> Option<Pick<'a>>
where
    F: FnMut(&Recipe) -> f64,
{
    for tier in Tier::ALL {
        let candidates = candidates(tier, sources, request);

        let pick = if tier == Tier::Absolute {
            candidates.first().map(|recipe| Pick {
                recipe,
                tier,
                cost: f64::INFINITY,
            })
        } else {
            select_best(&candidates, &mut score).map(|s| Pick {
                recipe: s.recipe,
                tier,
                cost: s.cost,
            })
        };

        if let Some(pick) = pick {
            return Some(pick);
        }

        tracing::debug!(
            meal_type = %request.meal_type,
            tier = ?tier,
            "no candidates at tier"
        );
    }

    None
}

/// Best plant-based candidate from every source, ignoring the calorie
/// window. Recipes already committed are only taken when no unused one
/// qualifies.
pub fn plant_based<'a, F>(sources: &Sources<'a>, request: &SlotRequest, mut score: F) -> Option<Pick<'a>>
where
    F: FnMut(&Recipe) -> f64,
{
    let (unused, used): (Vec<_>, Vec<_>) = candidates(Tier::PlantBased, sources, request)
        .into_iter()
        .filter(|recipe| recipe.is_plant_based())
        .partition(|recipe| !request.tracker.is_committed(&recipe.id));

    let candidates = if unused.is_empty() { used } else { unused };

    select_best(&candidates, &mut score).map(|s| Pick {
        recipe: s.recipe,
        tier: Tier::PlantBased,
        cost: s.cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::KeywordClassifier;
    use crate::suitability::CuisinePreferences;
    use imkitchen_shared::user::DietType;

    struct Fixture {
        filter: SuitabilityFilter,
        tracker: VarietyTracker,
        excluded: HashSet<String>,
    }

    impl Fixture {
        fn new(diet_type: DietType) -> Self {
            Self {
                filter: SuitabilityFilter {
                    diet_type,
                    exclusions: vec![],
                    cuisines: CuisinePreferences::default(),
                },
                tracker: VarietyTracker::new(),
                excluded: HashSet::new(),
            }
        }

        fn request(&self, meal_type: MealType, policy: UniquenessPolicy) -> SlotRequest<'_> {
            SlotRequest {
                meal_type,
                target_calories: 700.0,
                filter: &self.filter,
                classifier: &KeywordClassifier,
                policy,
                tracker: &self.tracker,
                excluded: &self.excluded,
                require: None,
            }
        }
    }

    fn calorie_distance(recipe: &Recipe) -> f64 {
        (recipe.nutrition.calories as f64 - 700.0).abs()
    }

    fn pick_id(pick: Option<Pick>) -> Option<(String, Tier)> {
        pick.map(|p| (p.recipe.id.to_owned(), p.tier))
    }

    #[test]
    fn test_tags() {
        assert_eq!(Tier::Primary.tag(MealType::Breakfast), "breakfast");
        assert_eq!(Tier::PrimaryRelaxed.tag(MealType::Lunch), "lunch-relaxed");
        assert_eq!(Tier::Bundled.tag(MealType::Breakfast), "breakfast-fallback");
    }

    #[test]
    fn test_primary_picks_closest_calories() {
        let primary = vec![
            Recipe::new("a", "Pasta").calories(600),
            Recipe::new("b", "Rice Bowl").calories(690),
            Recipe::new("c", "Wrap").calories(1200),
        ];
        let sources = Sources {
            primary: &primary,
            ..Default::default()
        };
        let fixture = Fixture::new(DietType::Any);
        let request = fixture.request(MealType::Dinner, UniquenessPolicy::PreferUnique);

        let pick = cascade(&sources, &request, calorie_distance);

        assert_eq!(pick_id(pick), Some(("b".to_owned(), Tier::Primary)));
    }

    #[test]
    fn test_relaxed_tier_reuses_committed() {
        let primary = vec![Recipe::new("a", "Pasta").calories(700)];
        let sources = Sources {
            primary: &primary,
            ..Default::default()
        };
        let mut fixture = Fixture::new(DietType::Any);
        fixture.tracker.commit_id("a");

        let request = fixture.request(MealType::Dinner, UniquenessPolicy::PreferUnique);
        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("a".to_owned(), Tier::PrimaryRelaxed))
        );

        let request = fixture.request(MealType::Dinner, UniquenessPolicy::Strict);
        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("a".to_owned(), Tier::Absolute))
        );
    }

    #[test]
    fn test_local_window_is_wider() {
        let primary = vec![Recipe::new("a", "Huge Plate").calories(1000)];
        let local = vec![Recipe::new("b", "Big Plate").calories(950)];
        let sources = Sources {
            primary: &primary,
            local: &local,
            ..Default::default()
        };
        let fixture = Fixture::new(DietType::Any);
        let request = fixture.request(MealType::Lunch, UniquenessPolicy::Off);

        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("b".to_owned(), Tier::Local))
        );
    }

    #[test]
    fn test_bundled_then_absolute() {
        let bundled = vec![Recipe::new("v", "Veggie Curry").dietary(["vegan"]).calories(700)];
        let sources = Sources {
            bundled: &bundled,
            ..Default::default()
        };

        let fixture = Fixture::new(DietType::Vegan);
        let request = fixture.request(MealType::Dinner, UniquenessPolicy::Off);
        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("v".to_owned(), Tier::Bundled))
        );

        let fixture = Fixture::new(DietType::Keto);
        let request = fixture.request(MealType::Dinner, UniquenessPolicy::Off);
        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("v".to_owned(), Tier::Absolute))
        );
    }

    #[test]
    fn test_absolute_still_requires_breakfast_appropriate() {
        let bundled = vec![
            Recipe::new("curry", "Beef Curry").calories(500),
            Recipe::new("oats", "Oatmeal").calories(3000),
        ];
        let sources = Sources {
            bundled: &bundled,
            ..Default::default()
        };
        let fixture = Fixture::new(DietType::Any);
        let request = fixture.request(MealType::Breakfast, UniquenessPolicy::Off);

        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("oats".to_owned(), Tier::Absolute))
        );
    }

    #[test]
    fn test_exhausted() {
        let fixture = Fixture::new(DietType::Any);
        let request = fixture.request(MealType::Dinner, UniquenessPolicy::Strict);

        assert!(cascade(&Sources::default(), &request, calorie_distance).is_none());
    }

    #[test]
    fn test_plant_based_ignores_calorie_window() {
        let primary = vec![Recipe::new("a", "Chicken Stew").calories(700)];
        let local = vec![
            Recipe::new("b", "Chickpea Salad").dietary(["vegan"]).calories(300),
            Recipe::new("c", "Tofu Scramble Bowl").dietary(["vegan"]).calories(250),
            Recipe::new("d", "Peanut Noodles").dietary(["vegan"]).ingredients(["peanut butter"]).calories(650),
        ];
        let sources = Sources {
            primary: &primary,
            local: &local,
            ..Default::default()
        };
        let mut fixture = Fixture::new(DietType::Any);
        fixture.filter.exclusions = vec!["peanut".to_owned()];
        let mut request = fixture.request(MealType::Lunch, UniquenessPolicy::Strict);
        request.require = Some(Recipe::is_plant_based);

        let pick = cascade(&sources, &request, calorie_distance);
        assert_eq!(pick.map(|p| p.tier), Some(Tier::Absolute));

        assert_eq!(
            pick_id(plant_based(&sources, &request, calorie_distance)),
            Some(("b".to_owned(), Tier::PlantBased))
        );
    }

    #[test]
    fn test_plant_based_prefers_unused() {
        let local = vec![
            Recipe::new("b", "Chickpea Salad").dietary(["vegan"]).calories(700),
            Recipe::new("c", "Lentil Soup").dietary(["vegan"]).calories(300),
        ];
        let sources = Sources {
            local: &local,
            ..Default::default()
        };
        let mut fixture = Fixture::new(DietType::Any);
        fixture.tracker.commit_id("b");

        let request = fixture.request(MealType::Lunch, UniquenessPolicy::Strict);
        assert_eq!(
            pick_id(plant_based(&sources, &request, calorie_distance)),
            Some(("c".to_owned(), Tier::PlantBased))
        );

        fixture.tracker.commit_id("c");
        let request = fixture.request(MealType::Lunch, UniquenessPolicy::Strict);
        assert_eq!(
            pick_id(plant_based(&sources, &request, calorie_distance)),
            Some(("b".to_owned(), Tier::PlantBased))
        );
    }

    #[test]
    fn test_require_predicate_applies_everywhere() {
        let primary = vec![
            Recipe::new("a", "Chicken Stew").calories(700),
            Recipe::new("b", "Lentil Stew").dietary(["vegan"]).calories(2000),
        ];
        let sources = Sources {
            primary: &primary,
            ..Default::default()
        };
        let fixture = Fixture::new(DietType::Any);
        let mut request = fixture.request(MealType::Dinner, UniquenessPolicy::Off);
        request.require = Some(Recipe::is_plant_based);

        assert_eq!(
            pick_id(cascade(&sources, &request, calorie_distance)),
            Some(("b".to_owned(), Tier::Absolute))
        );
    }
}
