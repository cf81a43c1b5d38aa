use std::collections::HashMap;

use imkitchen_shared::recipe::Recipe;

use crate::classifier::Classifier;

/// Run-scoped variety state. Created empty for every top-level invocation and
/// updated right after each commit so later slots see earlier choices.
#[derive(Clone, Debug, Default)]
pub struct VarietyTracker {
    /// Slots holding each id; an id stays committed until its last holder is released.
    committed: HashMap<String, u32>,
    main_counts: HashMap<String, u32>,
    cuisine_counts: HashMap<String, u32>,
}

impl VarietyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_committed(&self, recipe_id: &str) -> bool {
        self.committed.contains_key(recipe_id)
    }

    pub fn committed(&self) -> impl Iterator<Item = &str> {
        self.committed.keys().map(String::as_str)
    }

    pub fn main_count(&self, main_ingredient: Option<&str>) -> u32 {
        main_ingredient
            .and_then(|m| self.main_counts.get(m))
            .copied()
            .unwrap_or_default()
    }

    pub fn cuisine_count(&self, cuisine: Option<&str>) -> u32 {
        cuisine
            .and_then(|c| self.cuisine_counts.get(c))
            .copied()
            .unwrap_or_default()
    }

    pub fn commit(&mut self, recipe: &Recipe, classifier: &dyn Classifier) {
        self.commit_parts(
            &recipe.id,
            classifier.main_ingredient(recipe).as_deref(),
            classifier.cuisine(recipe).as_deref(),
        );
    }

    /// Commit by id alone, for slots whose recipe can no longer be resolved.
    pub fn commit_id(&mut self, recipe_id: &str) {
        self.commit_parts(recipe_id, None, None);
    }

    fn commit_parts(&mut self, recipe_id: &str, main: Option<&str>, cuisine: Option<&str>) {
        *self.committed.entry(recipe_id.to_owned()).or_default() += 1;

        if let Some(main) = main {
            *self.main_counts.entry(main.to_owned()).or_default() += 1;
        }

        if let Some(cuisine) = cuisine {
            *self.cuisine_counts.entry(cuisine.to_owned()).or_default() += 1;
        }
    }

    /// Undo one commit of `recipe`, used when a slot is replaced in place.
    pub fn release(&mut self, recipe: &Recipe, classifier: &dyn Classifier) {
        decrement(&mut self.committed, &recipe.id);

        if let Some(main) = classifier.main_ingredient(recipe) {
            decrement(&mut self.main_counts, &main);
        }

        if let Some(cuisine) = classifier.cuisine(recipe) {
            decrement(&mut self.cuisine_counts, &cuisine);
        }
    }
}

fn decrement(counts: &mut HashMap<String, u32>, key: &str) {
    if let Some(count) = counts.get_mut(key) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            counts.remove(key);
        }
    }
}
