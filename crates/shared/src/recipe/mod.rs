use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// Generation order within a day.
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    /// Share of the daily calorie goal allocated to this meal (30/35/35).
    pub fn calorie_share(&self) -> f64 {
        match self {
            MealType::Breakfast => 0.30,
            MealType::Lunch | MealType::Dinner => 0.35,
        }
    }

    pub fn target_calories(&self, calorie_goal: u32) -> f64 {
        calorie_goal as f64 * self.calorie_share()
    }
}

#[derive(
    EnumString,
    Display,
    VariantArray,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Intermediate,
    Complex,
}

/// Per-serving macros.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: u32,
    #[serde(default)]
    pub protein: f32,
    #[serde(default)]
    pub carbs: f32,
    #[serde(default)]
    pub fat: f32,
    #[serde(default)]
    pub fiber: f32,
}

/// A recipe as fetched from one of the candidate sources. Treated as
/// immutable for the duration of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub fitness_goals: Vec<String>,
}

impl Recipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn calories(mut self, calories: u32) -> Self {
        self.nutrition.calories = calories;
        self
    }

    pub fn macros(mut self, protein: f32, carbs: f32, fat: f32, fiber: f32) -> Self {
        self.nutrition.protein = protein;
        self.nutrition.carbs = carbs;
        self.nutrition.fat = fat;
        self.nutrition.fiber = fiber;
        self
    }

    pub fn meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn dietary<I, S>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dietary_preferences = preferences.into_iter().map(Into::into).collect();
        self
    }

    /// Checks dietary preference tags and free-text tags, ignoring case and
    /// `_`/` `/`-` differences.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = normalize_tag(tag);

        self.dietary_preferences
            .iter()
            .chain(self.tags.iter())
            .any(|t| normalize_tag(t) == tag)
    }

    pub fn is_plant_based(&self) -> bool {
        self.has_tag("vegetarian") || self.has_tag("vegan")
    }
}

pub fn normalize_tag(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}
