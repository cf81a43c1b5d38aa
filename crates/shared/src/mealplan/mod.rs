use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::recipe::{MealType, Nutrition, Recipe};

pub const MIN_SERVINGS: u8 = 1;
pub const MAX_SERVINGS: u8 = 20;

fn servings_in_range(servings: u8) -> bool {
    (MIN_SERVINGS..=MAX_SERVINGS).contains(&servings)
}

/// Stored and imported slots go through the same bounds as `set_servings`.
fn deserialize_servings<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let servings = u8::deserialize(deserializer)?;

    if !servings_in_range(servings) {
        return Err(serde::de::Error::custom(format!(
            "servings must be between {MIN_SERVINGS} and {MAX_SERVINGS}, got {servings}"
        )));
    }

    Ok(servings)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotRef {
    pub date: NaiveDate,
    pub meal_type: MealType,
}

impl SlotRef {
    pub fn new(date: NaiveDate, meal_type: MealType) -> Self {
        Self { date, meal_type }
    }
}

#[derive(
    EnumString, Display, AsRefStr, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionKind {
    /// Dinner carried over to a later lunch.
    Leftover,
    /// Breakfast cooked once for several mornings.
    MakeAhead,
    /// Breakfast held by the repeat/alternate strategies.
    Repeat,
}

impl ProjectionKind {
    pub fn name_suffix(&self) -> Option<&'static str> {
        match self {
            ProjectionKind::Leftover => Some("(Leftovers)"),
            ProjectionKind::MakeAhead => Some("(Make-ahead)"),
            ProjectionKind::Repeat => None,
        }
    }
}

/// Back-reference from a projected slot to the slot it was copied from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeftoverSource {
    pub source_date: NaiveDate,
    pub source_meal_type: MealType,
    pub kind: ProjectionKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealSlot {
    pub recipe_id: String,
    pub recipe_name: String,
    /// Frozen at assignment time, later recipe edits never reach it.
    pub nutrition: Nutrition,
    #[serde(deserialize_with = "deserialize_servings")]
    pub servings: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub batch_prep: bool,
    #[serde(default)]
    pub is_leftover: bool,
    #[serde(default)]
    pub leftover_source: Option<LeftoverSource>,
    #[serde(default)]
    pub repurpose_suggestion: Option<String>,
    /// Slots this one was projected onto.
    #[serde(default)]
    pub projected_to: Vec<SlotRef>,
}

impl MealSlot {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            recipe_id: recipe.id.to_owned(),
            recipe_name: recipe.name.to_owned(),
            nutrition: recipe.nutrition.clone(),
            servings: MIN_SERVINGS,
            notes: None,
            batch_prep: false,
            is_leftover: false,
            leftover_source: None,
            repurpose_suggestion: None,
            projected_to: vec![],
        }
    }

    /// Copy of `self` linked back to `source`.
    pub fn project(&self, source: SlotRef, kind: ProjectionKind) -> Self {
        let recipe_name = match kind.name_suffix() {
            Some(suffix) => format!("{} {suffix}", self.recipe_name),
            _ => self.recipe_name.to_owned(),
        };

        Self {
            recipe_id: self.recipe_id.to_owned(),
            recipe_name,
            nutrition: self.nutrition.clone(),
            servings: self.servings,
            notes: None,
            batch_prep: kind != ProjectionKind::Repeat,
            is_leftover: kind == ProjectionKind::Leftover,
            leftover_source: Some(LeftoverSource {
                source_date: source.date,
                source_meal_type: source.meal_type,
                kind,
            }),
            repurpose_suggestion: None,
            projected_to: vec![],
        }
    }

    pub fn is_linked(&self) -> bool {
        self.leftover_source.is_some()
    }

    pub fn set_servings(&mut self, servings: u8) -> crate::Result<()> {
        if !servings_in_range(servings) {
            crate::invalid!(
                "servings must be between {} and {}, got {}",
                MIN_SERVINGS,
                MAX_SERVINGS,
                servings
            );
        }

        self.servings = servings;

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyMealPlan {
    pub date: NaiveDate,
    #[serde(default)]
    pub breakfast: Option<MealSlot>,
    #[serde(default)]
    pub lunch: Option<MealSlot>,
    #[serde(default)]
    pub dinner: Option<MealSlot>,
}

impl DailyMealPlan {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            breakfast: None,
            lunch: None,
            dinner: None,
        }
    }

    pub fn slot(&self, meal_type: MealType) -> Option<&MealSlot> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, meal_type: MealType) -> &mut Option<MealSlot> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        }
    }

    pub fn set(&mut self, meal_type: MealType, slot: MealSlot) {
        *self.slot_mut(meal_type) = Some(slot);
    }

    pub fn take(&mut self, meal_type: MealType) -> Option<MealSlot> {
        self.slot_mut(meal_type).take()
    }

    pub fn filled(&self) -> impl Iterator<Item = (MealType, &MealSlot)> {
        MealType::ALL
            .into_iter()
            .filter_map(|m| self.slot(m).map(|s| (m, s)))
    }

    pub fn is_complete(&self) -> bool {
        MealType::ALL.iter().all(|m| self.slot(*m).is_some())
    }

    pub fn is_empty(&self) -> bool {
        MealType::ALL.iter().all(|m| self.slot(*m).is_none())
    }

    /// Sum of per-serving calorie snapshots.
    pub fn total_calories(&self) -> u32 {
        self.filled().map(|(_, s)| s.nutrition.calories).sum()
    }
}

/// Date-indexed plan, persisted independently of the generator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub days: BTreeMap<NaiveDate, DailyMealPlan>,
}

impl WeekPlan {
    pub fn from_days(days: impl IntoIterator<Item = DailyMealPlan>) -> Self {
        Self {
            days: days.into_iter().map(|d| (d.date, d)).collect(),
        }
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyMealPlan> {
        self.days.get(&date)
    }

    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DailyMealPlan {
        self.days
            .entry(date)
            .or_insert_with(|| DailyMealPlan::new(date))
    }

    pub fn slot(&self, slot: SlotRef) -> Option<&MealSlot> {
        self.day(slot.date).and_then(|d| d.slot(slot.meal_type))
    }

    pub fn slot_mut(&mut self, slot: SlotRef) -> Option<&mut MealSlot> {
        self.days
            .get_mut(&slot.date)
            .and_then(|d| d.slot_mut(slot.meal_type).as_mut())
    }

    pub fn is_empty_slot(&self, slot: SlotRef) -> bool {
        self.slot(slot).is_none()
    }

    pub fn slots(&self) -> impl Iterator<Item = (SlotRef, &MealSlot)> {
        self.days.values().flat_map(|d| {
            d.filled()
                .map(move |(meal_type, s)| (SlotRef::new(d.date, meal_type), s))
        })
    }

    /// True when `recipe_id` occupies any slot other than `except`.
    pub fn uses_recipe_elsewhere(&self, recipe_id: &str, except: SlotRef) -> bool {
        self.slots()
            .any(|(slot, s)| slot != except && s.recipe_id == recipe_id)
    }
}
