//! Meal-plan generation engine.
//!
//! [`GenerationEngine`] fills breakfast, lunch and dinner slots for one day
//! or a range of days. Each slot is a greedy pick: suitable candidates are
//! scored by [`cost::cost`] and taken from the first [`fallback::Tier`] that
//! has any, so a plan is produced even from a sparse recipe corpus.

pub mod bundled;
pub mod cache;
pub mod classifier;
pub mod cost;
mod daily;
mod engine;
pub mod fallback;
pub mod leftover;
pub mod provider;
mod result;
mod run;
pub mod store;
pub mod suitability;
mod swap;
pub mod variety;
mod weekly;

pub use classifier::{Classifier, KeywordClassifier};
pub use engine::*;
pub use provider::*;
pub use result::*;
pub use store::*;
pub use suitability::is_suitable;
pub use weekly::REPEAT_BLOCK_DAYS;

cfg_if::cfg_if! {
    if #[cfg(feature = "full")] {
        mod query;

        pub use query::*;
    }
}
