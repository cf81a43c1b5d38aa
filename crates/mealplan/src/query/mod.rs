//! SQLite-backed collaborators.

mod recipe;
mod slot;

pub use recipe::*;
pub use slot::*;
