use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

#[derive(
    EnumString,
    VariantArray,
    Display,
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
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum DietType {
    #[default]
    Any,
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    Paleo,
    LowCarb,
    GlutenFree,
    DairyFree,
    Mediterranean,
}

impl DietType {
    /// Tags a recipe must carry at least one of. Empty for `Any`.
    pub fn required_tags(&self) -> &'static [&'static str] {
        match self {
            DietType::Any => &[],
            DietType::Vegetarian => &["vegetarian", "vegan"],
            DietType::Vegan => &["vegan"],
            DietType::Pescatarian => &["pescatarian", "vegetarian", "vegan"],
            DietType::Keto => &["keto", "low-carb"],
            DietType::Paleo => &["paleo"],
            DietType::LowCarb => &["low-carb", "keto"],
            DietType::GlutenFree => &["gluten-free"],
            DietType::DairyFree => &["dairy-free", "vegan"],
            DietType::Mediterranean => &["mediterranean"],
        }
    }
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum BreakfastRepeatMode {
    #[default]
    NoRepeat,
    /// One breakfast held for a 3-day block.
    Repeat,
    /// Two breakfasts alternated by day parity.
    Alternate,
}

/// How hard recipe ids are kept unique across the generation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniquenessPolicy {
    Off,
    /// Unique on the strict tier only; relaxed tiers may repeat.
    PreferUnique,
    /// Unique on every tier except the absolute fallback.
    Strict,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPreferences {
    pub strict_uniqueness: bool,
    pub unique_per_week: bool,
    pub prefer_simple: bool,
    pub disallow_complex: bool,
    pub prefer_batch_prep: bool,
    pub plan_leftovers: bool,
    pub max_leftover_gap_days: u8,
    pub require_daily_plant_based: bool,
    pub breakfast_repeat: BreakfastRepeatMode,
    pub strong_simple_breakfast_bias: bool,
}

impl Default for GenerationPreferences {
    fn default() -> Self {
        Self {
            strict_uniqueness: false,
            unique_per_week: true,
            prefer_simple: false,
            disallow_complex: false,
            prefer_batch_prep: false,
            plan_leftovers: false,
            max_leftover_gap_days: 2,
            require_daily_plant_based: false,
            breakfast_repeat: BreakfastRepeatMode::NoRepeat,
            strong_simple_breakfast_bias: false,
        }
    }
}

impl GenerationPreferences {
    pub fn uniqueness(&self) -> UniquenessPolicy {
        if self.strict_uniqueness {
            UniquenessPolicy::Strict
        } else if self.unique_per_week {
            UniquenessPolicy::PreferUnique
        } else {
            UniquenessPolicy::Off
        }
    }

    pub fn leftover_gap_days(&self) -> u8 {
        self.max_leftover_gap_days.clamp(1, 3)
    }
}

/// Read-only snapshot supplied by the profile provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDietaryProfile {
    pub diet_type: DietType,
    pub allergies: Vec<String>,
    pub excluded_ingredients: Vec<String>,
    pub preferred_cuisines: Vec<String>,
    pub excluded_cuisines: Vec<String>,
    pub calorie_goal: u32,
    pub fitness_goals: Vec<String>,
    pub preferences: GenerationPreferences,
}

impl Default for UserDietaryProfile {
    fn default() -> Self {
        Self {
            diet_type: DietType::Any,
            allergies: vec![],
            excluded_ingredients: vec![],
            preferred_cuisines: vec![],
            excluded_cuisines: vec![],
            calorie_goal: 2000,
            fitness_goals: vec![],
            preferences: GenerationPreferences::default(),
        }
    }
}

impl UserDietaryProfile {
    pub fn primary_fitness_goal(&self) -> Option<&str> {
        self.fitness_goals.first().map(String::as_str)
    }

    /// Allergies and excluded ingredients, lowercased, blanks dropped.
    pub fn exclusion_terms(&self) -> Vec<String> {
        self.allergies
            .iter()
            .chain(self.excluded_ingredients.iter())
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
