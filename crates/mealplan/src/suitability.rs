use imkitchen_shared::recipe::Recipe;
use imkitchen_shared::user::{DietType, UserDietaryProfile};

use crate::classifier::Classifier;

#[derive(Clone, Debug, Default)]
pub struct CuisinePreferences {
    pub preferred: Vec<String>,
    pub excluded: Vec<String>,
}

impl CuisinePreferences {
    fn allows(&self, cuisine: Option<&str>) -> bool {
        let Some(cuisine) = cuisine else {
            return true;
        };

        if self.excluded.iter().any(|c| c.eq_ignore_ascii_case(cuisine)) {
            return false;
        }

        self.preferred.is_empty() || self.preferred.iter().any(|c| c.eq_ignore_ascii_case(cuisine))
    }
}

/// Eligibility rules derived from a profile.
#[derive(Clone, Debug, Default)]
pub struct SuitabilityFilter {
    pub diet_type: DietType,
    pub exclusions: Vec<String>,
    pub cuisines: CuisinePreferences,
}

impl SuitabilityFilter {
    pub fn from_profile(profile: &UserDietaryProfile) -> Self {
        Self {
            diet_type: profile.diet_type,
            exclusions: profile.exclusion_terms(),
            cuisines: CuisinePreferences {
                preferred: profile.preferred_cuisines.to_vec(),
                excluded: profile.excluded_cuisines.to_vec(),
            },
        }
    }

    pub fn passes_diet(&self, recipe: &Recipe) -> bool {
        let required = self.diet_type.required_tags();

        required.is_empty() || required.iter().any(|tag| recipe.has_tag(tag))
    }

    /// Case-insensitive substring match of every exclusion term against every
    /// ingredient line. Deliberately blunt: "nut" also rejects "butternut".
    pub fn passes_exclusions(&self, recipe: &Recipe) -> bool {
        !recipe.ingredients.iter().any(|line| {
            let line = line.to_lowercase();
            self.exclusions.iter().any(|term| line.contains(term.as_str()))
        })
    }

    pub fn passes_cuisine(&self, recipe: &Recipe, classifier: &dyn Classifier) -> bool {
        self.cuisines
            .allows(classifier.cuisine(recipe).as_deref())
    }

    pub fn is_suitable(&self, recipe: &Recipe, classifier: &dyn Classifier) -> bool {
        self.passes_diet(recipe)
            && self.passes_exclusions(recipe)
            && self.passes_cuisine(recipe, classifier)
    }

    /// Candidate counts before and after the diet and allergy stages, used in
    /// total-failure diagnostics.
    pub fn stats<'a>(&self, recipes: impl IntoIterator<Item = &'a Recipe>) -> FilterStats {
        let mut stats = FilterStats::default();

        for recipe in recipes {
            stats.total += 1;

            if !self.passes_diet(recipe) {
                continue;
            }
            stats.after_diet += 1;

            if self.passes_exclusions(recipe) {
                stats.after_allergy += 1;
            }
        }

        stats
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub after_diet: usize,
    pub after_allergy: usize,
}

impl std::ops::AddAssign for FilterStats {
    fn add_assign(&mut self, rhs: Self) {
        self.total += rhs.total;
        self.after_diet += rhs.after_diet;
        self.after_allergy += rhs.after_allergy;
    }
}

/// Pure eligibility predicate over explicit rule inputs.
pub fn is_suitable(
    recipe: &Recipe,
    diet_type: DietType,
    allergies: &[String],
    excluded_ingredients: &[String],
    cuisines: &CuisinePreferences,
    classifier: &dyn Classifier,
) -> bool {
    let filter = SuitabilityFilter {
        diet_type,
        exclusions: allergies
            .iter()
            .chain(excluded_ingredients.iter())
            .map(|t| normalize_term(t))
            .filter(|t| !t.is_empty())
            .collect(),
        cuisines: cuisines.clone(),
    };

    filter.is_suitable(recipe, classifier)
}

fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}
