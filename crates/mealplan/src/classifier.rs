//! Coarse recipe descriptors derived from free text.
//!
//! Upstream tagging is unreliable, so these are keyword approximations over
//! the recipe's name, tags and ingredient lines, not ground truth.

use imkitchen_shared::recipe::{Complexity, MealType, Recipe};

pub trait Classifier: Send + Sync {
    fn main_ingredient(&self, recipe: &Recipe) -> Option<String>;

    fn cuisine(&self, recipe: &Recipe) -> Option<String>;

    fn is_breakfast_appropriate(&self, recipe: &Recipe) -> bool;

    fn is_batch_friendly(&self, recipe: &Recipe) -> bool;

    fn complexity(&self, recipe: &Recipe) -> Complexity {
        recipe.complexity
    }

    fn repurpose_suggestion(&self, recipe: &Recipe) -> String;

    /// Breakfast must pass the appropriateness check; lunch and dinner accept
    /// anything not explicitly typed as breakfast.
    fn matches_meal_type(&self, recipe: &Recipe, meal_type: MealType) -> bool {
        match meal_type {
            MealType::Breakfast => self.is_breakfast_appropriate(recipe),
            MealType::Lunch | MealType::Dinner => recipe.meal_type != Some(MealType::Breakfast),
        }
    }
}

const MAIN_INGREDIENTS: &[&str] = &[
    "chicken",
    "turkey",
    "beef",
    "pork",
    "lamb",
    "salmon",
    "tuna",
    "shrimp",
    "cod",
    "tofu",
    "tempeh",
    "lentil",
    "chickpea",
    "black bean",
    "bean",
    "egg",
    "greek yogurt",
    "cottage cheese",
    "yogurt",
    "paneer",
    "cheese",
    "quinoa",
    "fish",
];

const CUISINES: &[&str] = &[
    "italian",
    "mexican",
    "chinese",
    "japanese",
    "korean",
    "thai",
    "vietnamese",
    "indian",
    "french",
    "spanish",
    "greek",
    "middle eastern",
    "mediterranean",
    "caribbean",
    "american",
];

const BREAKFAST_POSITIVE: &[&str] = &[
    "breakfast",
    "brunch",
    "oat",
    "porridge",
    "pancake",
    "waffle",
    "omelet",
    "omelette",
    "scramble",
    "frittata",
    "egg",
    "smoothie",
    "parfait",
    "yogurt",
    "granola",
    "muesli",
    "toast",
    "bagel",
    "muffin",
    "cereal",
    "chia",
    "crepe",
    "hash brown",
];

const BREAKFAST_NEGATIVE: &[&str] = &[
    "curry",
    "stir-fry",
    "stir fry",
    "lasagna",
    "burger",
    "steak",
    "pot roast",
    "stew",
    "chili",
    "soup",
    "spaghetti",
    "pasta",
    "taco",
    "pizza",
    "meatball",
    "risotto",
    "fried rice",
    "enchilada",
];

const BATCH_FRIENDLY: &[&str] = &[
    "make-ahead",
    "make ahead",
    "batch",
    "meal prep",
    "meal-prep",
    "slow cooker",
    "slow-cooker",
    "crockpot",
    "instant pot",
    "casserole",
    "stew",
    "chili",
    "soup",
    "curry",
    "lasagna",
    "overnight oats",
    "overnight",
    "freezer",
    "egg muffin",
];

/// `(main ingredient, dish style, suggestion)`; `None` matches anything,
/// first matching row wins.
const REPURPOSE_RULES: &[(Option<&str>, Option<&str>, &str)] = &[
    (
        Some("chicken"),
        Some("roast"),
        "Shred the leftover chicken for sandwiches or tacos",
    ),
    (
        None,
        Some("chili"),
        "Spoon the chili over baked potatoes or rice",
    ),
    (
        None,
        Some("curry"),
        "Pack the curry with rice or fold it into wraps",
    ),
    (
        None,
        Some("stew"),
        "Reheat the stew with crusty bread or over grains",
    ),
    (
        None,
        Some("soup"),
        "Reheat the soup and pair it with a sandwich",
    ),
    (
        None,
        Some("casserole"),
        "Portion the casserole into containers for easy reheating",
    ),
    (
        None,
        Some("lasagna"),
        "Portion the lasagna into containers for easy reheating",
    ),
    (
        Some("chicken"),
        None,
        "Slice the leftover chicken into a salad or wrap",
    ),
    (
        Some("turkey"),
        None,
        "Use the leftover turkey in sandwiches or a grain bowl",
    ),
    (
        Some("beef"),
        None,
        "Slice the beef thin for sandwiches or grain bowls",
    ),
    (
        Some("pork"),
        None,
        "Pull the pork apart for tacos or fried rice",
    ),
    (
        Some("salmon"),
        None,
        "Flake the salmon into a grain bowl or salad",
    ),
    (Some("fish"), None, "Flake the fish into tacos or a salad"),
    (
        Some("tofu"),
        None,
        "Toss the tofu into a noodle bowl or stir-fry",
    ),
    (
        Some("lentil"),
        None,
        "Mash the lentils into a spread or stuff them into wraps",
    ),
    (
        Some("chickpea"),
        None,
        "Toss the chickpeas onto a salad or blend them into hummus",
    ),
    (
        Some("bean"),
        None,
        "Fold the beans into burritos or quesadillas",
    ),
];

const GENERIC_REPURPOSE: &str = "Reheat for a quick lunch or repurpose into a wrap or grain bowl";

/// Keyword-table classifier.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn name_and_tags(recipe: &Recipe) -> Vec<String> {
        std::iter::once(&recipe.name)
            .chain(recipe.tags.iter())
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn first_hit<'a>(vocabulary: &[&'a str], haystack: &[String]) -> Option<&'a str> {
        vocabulary
            .iter()
            .find(|word| haystack.iter().any(|h| h.contains(*word)))
            .copied()
    }
}

impl Classifier for KeywordClassifier {
    fn main_ingredient(&self, recipe: &Recipe) -> Option<String> {
        let ingredients = recipe
            .ingredients
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>();

        Self::first_hit(MAIN_INGREDIENTS, &ingredients)
            .or_else(|| {
                let tags = recipe
                    .tags
                    .iter()
                    .map(|s| s.to_lowercase())
                    .collect::<Vec<_>>();

                Self::first_hit(MAIN_INGREDIENTS, &tags)
            })
            .map(str::to_owned)
    }

    fn cuisine(&self, recipe: &Recipe) -> Option<String> {
        let tags = recipe
            .tags
            .iter()
            .map(|s| s.to_lowercase())
            .collect::<Vec<_>>();

        Self::first_hit(CUISINES, &tags).map(str::to_owned)
    }

    fn is_breakfast_appropriate(&self, recipe: &Recipe) -> bool {
        let name_and_tags = Self::name_and_tags(recipe);

        if Self::first_hit(BREAKFAST_NEGATIVE, &name_and_tags).is_some() {
            return false;
        }

        if recipe.meal_type == Some(MealType::Breakfast) {
            return true;
        }

        let mut haystack = name_and_tags;
        haystack.extend(recipe.ingredients.iter().map(|s| s.to_lowercase()));

        Self::first_hit(BREAKFAST_POSITIVE, &haystack).is_some()
    }

    fn is_batch_friendly(&self, recipe: &Recipe) -> bool {
        Self::first_hit(BATCH_FRIENDLY, &Self::name_and_tags(recipe)).is_some()
    }

    fn repurpose_suggestion(&self, recipe: &Recipe) -> String {
        let main = self.main_ingredient(recipe);
        let name_and_tags = Self::name_and_tags(recipe);

        REPURPOSE_RULES
            .iter()
            .find(|(ingredient, style, _)| {
                let ingredient_ok = ingredient.is_none_or(|i| main.as_deref() == Some(i));
                let style_ok = style.is_none_or(|s| name_and_tags.iter().any(|h| h.contains(s)));

                ingredient_ok && style_ok
            })
            .map(|(_, _, suggestion)| *suggestion)
            .unwrap_or(GENERIC_REPURPOSE)
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_ingredient_prefers_ingredients_over_tags() {
        let recipe = Recipe::new("1", "Bowl")
            .ingredients(["2 cups cooked Quinoa", "200g chicken breast"])
            .tags(["tofu"]);

        assert_eq!(
            KeywordClassifier.main_ingredient(&recipe).as_deref(),
            Some("chicken")
        );

        let recipe = Recipe::new("2", "Bowl").tags(["Tofu", "quick"]);
        assert_eq!(
            KeywordClassifier.main_ingredient(&recipe).as_deref(),
            Some("tofu")
        );
    }

    #[test]
    fn test_cuisine_from_tags() {
        let recipe = Recipe::new("1", "Pad Thai").tags(["Thai", "noodles"]);
        assert_eq!(KeywordClassifier.cuisine(&recipe).as_deref(), Some("thai"));

        let recipe = Recipe::new("2", "Toast");
        assert_eq!(KeywordClassifier.cuisine(&recipe), None);
    }

    #[test]
    fn test_breakfast_negative_list_wins_over_meal_type() {
        let recipe = Recipe::new("1", "Beef Curry").meal_type(MealType::Breakfast);
        assert!(!KeywordClassifier.is_breakfast_appropriate(&recipe));

        let recipe = Recipe::new("2", "Veggie Scramble").meal_type(MealType::Dinner);
        assert!(KeywordClassifier.is_breakfast_appropriate(&recipe));

        let recipe = Recipe::new("3", "Green Salad").ingredients(["lettuce", "cucumber"]);
        assert!(!KeywordClassifier.is_breakfast_appropriate(&recipe));
    }

    #[test]
    fn test_batch_friendly() {
        assert!(KeywordClassifier.is_batch_friendly(&Recipe::new("1", "Slow Cooker Chili")));
        assert!(KeywordClassifier.is_batch_friendly(
            &Recipe::new("2", "Oats").tags(["overnight oats"])
        ));
        assert!(!KeywordClassifier.is_batch_friendly(&Recipe::new("3", "Seared Scallops")));
    }

    #[test]
    fn test_repurpose_suggestion() {
        let roast = Recipe::new("1", "Roast Chicken").ingredients(["1 whole chicken"]);
        assert_eq!(
            KeywordClassifier.repurpose_suggestion(&roast),
            "Shred the leftover chicken for sandwiches or tacos"
        );

        let unknown = Recipe::new("2", "Mystery Dish");
        assert_eq!(
            KeywordClassifier.repurpose_suggestion(&unknown),
            GENERIC_REPURPOSE
        );
    }

    #[test]
    fn test_matches_meal_type() {
        let typed_breakfast = Recipe::new("1", "Oatmeal").meal_type(MealType::Breakfast);

        assert!(KeywordClassifier.matches_meal_type(&typed_breakfast, MealType::Breakfast));
        assert!(!KeywordClassifier.matches_meal_type(&typed_breakfast, MealType::Dinner));
        assert!(KeywordClassifier.matches_meal_type(&Recipe::new("2", "Stew"), MealType::Lunch));
    }
}
