use chrono::NaiveDate;
use imkitchen_shared::mealplan::{DailyMealPlan, WeekPlan};
use tokio::sync::RwLock;

/// Persistence for generated plans.
#[async_trait::async_trait]
pub trait WeekPlanStore: Send + Sync {
    /// Days in `start..=end` that have at least one slot.
    async fn load_range(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<WeekPlan>;

    /// Replaces each given day. An empty day removes the stored one.
    async fn save_days(&self, days: &[DailyMealPlan]) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryWeekPlanStore {
    plan: RwLock<WeekPlan>,
}

impl InMemoryWeekPlanStore {
    pub fn new(plan: WeekPlan) -> Self {
        Self {
            plan: RwLock::new(plan),
        }
    }

    pub async fn snapshot(&self) -> WeekPlan {
        self.plan.read().await.clone()
    }
}

#[async_trait::async_trait]
impl WeekPlanStore for InMemoryWeekPlanStore {
    async fn load_range(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<WeekPlan> {
        let plan = self.plan.read().await;

        Ok(WeekPlan::from_days(
            plan.days
                .range(start..=end)
                .map(|(_, day)| day.clone())
                .filter(|day| !day.is_empty()),
        ))
    }

    async fn save_days(&self, days: &[DailyMealPlan]) -> anyhow::Result<()> {
        let mut plan = self.plan.write().await;

        for day in days {
            if day.is_empty() {
                plan.days.remove(&day.date);
            } else {
                plan.days.insert(day.date, day.clone());
            }
        }

        Ok(())
    }
}
