use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum MealPlanSlot {
    Table,
    UserId,
    Date,
    MealType,
    RecipeId,
    Data,
}

#[derive(Iden, Clone)]
pub enum Recipe {
    Table,
    Id,
    Name,
    MealType,
    Calories,
    Data,
}
