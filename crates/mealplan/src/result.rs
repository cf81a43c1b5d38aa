use chrono::NaiveDate;
use imkitchen_shared::recipe::MealType;
use serde::{Deserialize, Serialize};

use crate::suitability::FilterStats;

/// Outcome of one generation call. Never an `Err`: failures are carried in
/// `error` and `suggestions`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    /// Filled slots, tagged with the tier that supplied them, e.g.
    /// `"lunch-relaxed"` or `"2025-01-21:lunch-leftover"`.
    pub generated_meals: Vec<String>,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

impl GenerationResult {
    pub fn failed(error: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            generated_meals: vec![],
            error: Some(error.into()),
            suggestions,
        }
    }
}

/// A slot every tier failed to fill.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotFailure {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub stats: FilterStats,
}

pub(crate) fn total_failure_message(stats: FilterStats) -> String {
    format!(
        "No meals could be generated: {} candidates, {} after diet filter, {} after allergy filter",
        stats.total, stats.after_diet, stats.after_allergy
    )
}
