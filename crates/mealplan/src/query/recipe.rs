use imkitchen_db::table::Recipe as RecipeTable;
use imkitchen_shared::recipe::{MealType, Recipe};
use sea_query::{Cond, Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

use crate::provider::{PoolQuery, RecipePoolProvider};

#[derive(Default, FromRow)]
pub struct RecipeRow {
    pub id: String,
    pub data: String,
}

impl RecipeRow {
    fn decode(self) -> Option<Recipe> {
        match serde_json::from_str(&self.data) {
            Ok(recipe) => Some(recipe),
            Err(err) => {
                tracing::warn!(err = %err, recipe_id = %self.id, "skipping unreadable recipe row");
                None
            }
        }
    }
}

/// Recipe pool stored in the `recipe` table. Only meal type, calories and
/// excluded ids are filtered in SQL.
#[derive(Clone)]
pub struct SqliteRecipePool(pub SqlitePool);

impl SqliteRecipePool {
    /// Inserts or replaces `recipes`. Returns how many were written.
    pub async fn import(&self, recipes: &[Recipe]) -> anyhow::Result<usize> {
        let mut tx = self.0.begin().await?;

        for recipe in recipes {
            let statement = Query::insert()
                .into_table(RecipeTable::Table)
                .columns([
                    RecipeTable::Id,
                    RecipeTable::Name,
                    RecipeTable::MealType,
                    RecipeTable::Calories,
                    RecipeTable::Data,
                ])
                .values([
                    recipe.id.to_owned().into(),
                    recipe.name.to_owned().into(),
                    recipe.meal_type.map(|m| m.to_string()).into(),
                    recipe.nutrition.calories.into(),
                    serde_json::to_string(recipe)?.into(),
                ])?
                .on_conflict(
                    OnConflict::column(RecipeTable::Id)
                        .update_columns([
                            RecipeTable::Name,
                            RecipeTable::MealType,
                            RecipeTable::Calories,
                            RecipeTable::Data,
                        ])
                        .to_owned(),
                )
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(recipes.len())
    }
}

fn meal_type_cond(meal_type: MealType) -> Cond {
    let hint = Expr::col(RecipeTable::MealType);
    let breakfast = MealType::Breakfast.to_string();

    let matches = match meal_type {
        MealType::Breakfast => hint.eq(breakfast),
        MealType::Lunch | MealType::Dinner => hint.ne(breakfast),
    };

    Cond::any()
        .add(Expr::col(RecipeTable::MealType).is_null())
        .add(matches)
}

#[async_trait::async_trait]
impl RecipePoolProvider for SqliteRecipePool {
    async fn fetch(
        &self,
        meal_type: MealType,
        query: &PoolQuery,
        limit: usize,
    ) -> anyhow::Result<Vec<Recipe>> {
        let mut statement = Query::select()
            .columns([RecipeTable::Id, RecipeTable::Data])
            .from(RecipeTable::Table)
            .cond_where(meal_type_cond(meal_type))
            .order_by(RecipeTable::Id, Order::Asc)
            .limit(limit as u64)
            .to_owned();

        if let Some((min, max)) = query.calorie_range {
            statement.and_where(Expr::col(RecipeTable::Calories).between(min, max));
        }

        if !query.exclude_ids.is_empty() {
            statement.and_where(Expr::col(RecipeTable::Id).is_not_in(query.exclude_ids.to_vec()));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        Ok(rows.into_iter().filter_map(RecipeRow::decode).collect())
    }

    async fn find(&self, id: &str) -> anyhow::Result<Option<Recipe>> {
        let statement = Query::select()
            .columns([RecipeTable::Id, RecipeTable::Data])
            .from(RecipeTable::Table)
            .and_where(Expr::col(RecipeTable::Id).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_optional(&self.0)
            .await?;

        Ok(row.and_then(RecipeRow::decode))
    }
}
