mod mealplan_slot;
mod recipe;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "imkitchen",
    "m0001",
    vec_box![],
    vec_box![
        mealplan_slot::CreateTable,
        mealplan_slot::CreateIdx1,
        recipe::CreateTable,
        recipe::CreateIdx1,
        recipe::CreateIdx2
    ]
);
