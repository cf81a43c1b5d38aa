//! Last-resort recipes shipped with the binary.

use std::sync::LazyLock;

use imkitchen_shared::recipe::{Complexity, MealType, Recipe};

static DEFAULT_RECIPES: LazyLock<Vec<Recipe>> = LazyLock::new(|| {
    vec![
        Recipe::new("bundled-overnight-oats", "Overnight Oats with Berries")
            .meal_type(MealType::Breakfast)
            .calories(520)
            .macros(18.0, 78.0, 14.0, 10.0)
            .complexity(Complexity::Simple)
            .tags(["make-ahead", "overnight oats"])
            .dietary(["vegetarian"])
            .ingredients(["rolled oats", "milk", "chia seeds", "mixed berries", "honey"]),
        Recipe::new("bundled-veggie-scramble", "Spinach and Feta Egg Scramble")
            .meal_type(MealType::Breakfast)
            .calories(560)
            .macros(32.0, 30.0, 32.0, 5.0)
            .complexity(Complexity::Simple)
            .dietary(["vegetarian", "gluten-free"])
            .ingredients(["eggs", "spinach", "feta cheese", "whole grain toast"]),
        Recipe::new("bundled-tofu-breakfast-burrito", "Tofu Breakfast Burrito")
            .meal_type(MealType::Breakfast)
            .calories(610)
            .macros(28.0, 70.0, 22.0, 12.0)
            .complexity(Complexity::Intermediate)
            .tags(["mexican"])
            .dietary(["vegan", "dairy-free"])
            .ingredients(["firm tofu", "flour tortilla", "black beans", "salsa", "avocado"]),
        Recipe::new("bundled-yogurt-parfait", "Greek Yogurt Parfait")
            .meal_type(MealType::Breakfast)
            .calories(480)
            .macros(30.0, 58.0, 12.0, 6.0)
            .complexity(Complexity::Simple)
            .dietary(["vegetarian"])
            .ingredients(["greek yogurt", "granola", "banana", "walnuts"]),
        Recipe::new("bundled-smoked-salmon-bagel", "Smoked Salmon Bagel")
            .meal_type(MealType::Breakfast)
            .calories(640)
            .macros(34.0, 66.0, 22.0, 3.0)
            .complexity(Complexity::Simple)
            .dietary(["pescatarian"])
            .ingredients(["bagel", "smoked salmon", "cream cheese", "capers", "red onion"]),
        Recipe::new("bundled-chickpea-salad", "Mediterranean Chickpea Salad")
            .meal_type(MealType::Lunch)
            .calories(650)
            .macros(24.0, 72.0, 28.0, 16.0)
            .complexity(Complexity::Simple)
            .tags(["mediterranean"])
            .dietary(["vegan", "gluten-free", "mediterranean"])
            .ingredients(["chickpeas", "cucumber", "cherry tomatoes", "olive oil", "lemon"]),
        Recipe::new("bundled-turkey-wrap", "Turkey Avocado Wrap")
            .meal_type(MealType::Lunch)
            .calories(680)
            .macros(42.0, 58.0, 28.0, 9.0)
            .complexity(Complexity::Simple)
            .tags(["american"])
            .ingredients(["sliced turkey", "whole wheat tortilla", "avocado", "lettuce"]),
        Recipe::new("bundled-lentil-soup", "Red Lentil Soup")
            .meal_type(MealType::Lunch)
            .calories(620)
            .macros(30.0, 88.0, 12.0, 20.0)
            .complexity(Complexity::Simple)
            .tags(["batch", "indian"])
            .dietary(["vegan", "gluten-free", "dairy-free"])
            .ingredients(["red lentils", "carrots", "onion", "cumin", "vegetable stock"]),
        Recipe::new("bundled-tuna-quinoa-bowl", "Tuna Quinoa Bowl")
            .meal_type(MealType::Lunch)
            .calories(720)
            .macros(46.0, 64.0, 26.0, 8.0)
            .complexity(Complexity::Intermediate)
            .dietary(["pescatarian", "gluten-free"])
            .ingredients(["canned tuna", "quinoa", "edamame", "cucumber", "sesame dressing"]),
        Recipe::new("bundled-caprese-sandwich", "Caprese Sandwich")
            .meal_type(MealType::Lunch)
            .calories(700)
            .macros(28.0, 74.0, 30.0, 5.0)
            .complexity(Complexity::Simple)
            .tags(["italian"])
            .dietary(["vegetarian"])
            .ingredients(["ciabatta", "mozzarella cheese", "tomato", "basil", "pesto"]),
        Recipe::new("bundled-chicken-stew", "Slow Cooker Chicken Stew")
            .meal_type(MealType::Dinner)
            .calories(690)
            .macros(48.0, 52.0, 26.0, 9.0)
            .complexity(Complexity::Simple)
            .tags(["slow cooker", "american"])
            .dietary(["gluten-free", "dairy-free"])
            .ingredients(["chicken thighs", "potatoes", "carrots", "celery", "chicken stock"]),
        Recipe::new("bundled-veggie-chili", "Three Bean Veggie Chili")
            .meal_type(MealType::Dinner)
            .calories(660)
            .macros(32.0, 96.0, 12.0, 28.0)
            .complexity(Complexity::Simple)
            .tags(["batch", "mexican"])
            .dietary(["vegan", "gluten-free", "dairy-free"])
            .ingredients(["kidney beans", "black beans", "pinto beans", "crushed tomatoes", "onion"]),
        Recipe::new("bundled-salmon-traybake", "Lemon Herb Salmon Traybake")
            .meal_type(MealType::Dinner)
            .calories(720)
            .macros(44.0, 40.0, 38.0, 7.0)
            .complexity(Complexity::Intermediate)
            .tags(["mediterranean"])
            .dietary(["pescatarian", "gluten-free", "mediterranean"])
            .ingredients(["salmon fillets", "baby potatoes", "green beans", "lemon", "olive oil"]),
        Recipe::new("bundled-beef-stir-fry", "Beef and Broccoli Stir-Fry")
            .meal_type(MealType::Dinner)
            .calories(740)
            .macros(46.0, 62.0, 30.0, 6.0)
            .complexity(Complexity::Intermediate)
            .tags(["chinese"])
            .dietary(["dairy-free"])
            .ingredients(["flank steak beef", "broccoli", "soy sauce", "garlic", "jasmine rice"]),
        Recipe::new("bundled-veggie-lasagna", "Spinach Ricotta Lasagna")
            .meal_type(MealType::Dinner)
            .calories(710)
            .macros(34.0, 70.0, 30.0, 8.0)
            .complexity(Complexity::Complex)
            .tags(["italian"])
            .dietary(["vegetarian"])
            .ingredients(["lasagna sheets", "ricotta cheese", "spinach", "marinara sauce", "mozzarella cheese"]),
    ]
});

/// The bundled dataset. Always available, never empty.
pub fn default_recipes() -> Vec<Recipe> {
    DEFAULT_RECIPES.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, KeywordClassifier};
    use std::collections::HashSet;

    #[test]
    fn test_dataset_covers_every_meal_type() {
        let recipes = default_recipes();

        for meal_type in MealType::ALL {
            let count = recipes
                .iter()
                .filter(|r| r.meal_type == Some(meal_type))
                .count();
            assert!(count >= 4, "{meal_type} has {count} recipes");
        }

        let ids = recipes.iter().map(|r| r.id.as_str()).collect::<HashSet<_>>();
        assert_eq!(ids.len(), recipes.len());
    }

    #[test]
    fn test_dataset_has_plant_based_and_batch_friendly_dishes() {
        let recipes = default_recipes();

        for meal_type in MealType::ALL {
            assert!(
                recipes
                    .iter()
                    .any(|r| r.meal_type == Some(meal_type) && r.is_plant_based())
            );
        }

        assert!(recipes.iter().any(|r| {
            r.meal_type == Some(MealType::Dinner) && KeywordClassifier.is_batch_friendly(r)
        }));
        assert!(
            recipes
                .iter()
                .filter(|r| r.meal_type == Some(MealType::Breakfast))
                .all(|r| KeywordClassifier.is_breakfast_appropriate(r))
        );
    }
}
