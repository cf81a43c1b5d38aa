use std::str::FromStr;

use chrono::NaiveDate;
use imkitchen_db::table::MealPlanSlot;
use imkitchen_shared::mealplan::{DailyMealPlan, MealSlot, WeekPlan};
use imkitchen_shared::recipe::MealType;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Default, FromRow)]
pub struct SlotRow {
    pub date: String,
    pub meal_type: String,
    pub data: String,
}

impl SlotRow {
    fn decode(&self) -> anyhow::Result<(NaiveDate, MealType, MealSlot)> {
        Ok((
            NaiveDate::parse_from_str(&self.date, DATE_FORMAT)?,
            MealType::from_str(&self.meal_type)?,
            serde_json::from_str(&self.data)?,
        ))
    }
}

/// Week plans of one user, one row per filled slot.
#[derive(Clone)]
pub struct SqliteWeekPlanStore {
    pool: SqlitePool,
    user_id: String,
}

impl SqliteWeekPlanStore {
    pub fn new(pool: SqlitePool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }
}

#[async_trait::async_trait]
impl crate::store::WeekPlanStore for SqliteWeekPlanStore {
    async fn load_range(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<WeekPlan> {
        let statement = Query::select()
            .columns([
                MealPlanSlot::Date,
                MealPlanSlot::MealType,
                MealPlanSlot::Data,
            ])
            .from(MealPlanSlot::Table)
            .and_where(Expr::col(MealPlanSlot::UserId).eq(&self.user_id))
            .and_where(Expr::col(MealPlanSlot::Date).gte(start.format(DATE_FORMAT).to_string()))
            .and_where(Expr::col(MealPlanSlot::Date).lte(end.format(DATE_FORMAT).to_string()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, SlotRow, _>(&sql, values)
            .fetch_all(&self.pool)
            .await?;

        let mut plan = WeekPlan::default();
        for row in rows {
            let (date, meal_type, slot) = row.decode()?;
            plan.day_mut(date).set(meal_type, slot);
        }

        Ok(plan)
    }

    async fn save_days(&self, days: &[DailyMealPlan]) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        for day in days {
            let date = day.date.format(DATE_FORMAT).to_string();

            let statement = Query::delete()
                .from_table(MealPlanSlot::Table)
                .and_where(Expr::col(MealPlanSlot::UserId).eq(&self.user_id))
                .and_where(Expr::col(MealPlanSlot::Date).eq(&date))
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;

            for (meal_type, slot) in day.filled() {
                let statement = Query::insert()
                    .into_table(MealPlanSlot::Table)
                    .columns([
                        MealPlanSlot::UserId,
                        MealPlanSlot::Date,
                        MealPlanSlot::MealType,
                        MealPlanSlot::RecipeId,
                        MealPlanSlot::Data,
                    ])
                    .values([
                        self.user_id.to_owned().into(),
                        date.to_owned().into(),
                        meal_type.to_string().into(),
                        slot.recipe_id.to_owned().into(),
                        serde_json::to_string(slot)?.into(),
                    ])?
                    .to_owned();

                let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
                sqlx::query_with(&sql, values).execute(&mut *tx).await?;
            }
        }

        tx.commit().await?;

        Ok(())
    }
}
