/// Savings goals
///
/// `current_amount` only ever grows: contributions are applied as a single
/// relative `UPDATE ... SET current_amount = current_amount + ?`, so
/// concurrent contributions add up instead of overwriting each other.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;

pub const DEFAULT_GOAL_COLOR: &str = "#10b981";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SavingsGoal {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: Option<NaiveDate>,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    /// Progress towards the target as a percentage, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.target_amount * 100.0).min(100.0)
    }
}

#[derive(Debug, Clone)]
pub struct CreateSavingsGoal {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: Option<f64>,
    pub target_date: Option<NaiveDate>,
    pub color: Option<String>,
}

const GOAL_COLUMNS: &str = "id, user_id, name, target_amount, current_amount, target_date, color, created_at";

impl SavingsGoal {
    /// Lists goals by target date; goals without one come last
    pub async fn list(pool: &SqlitePool, owner: Owner) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SavingsGoal>(&format!(
            "SELECT {} FROM savings_goals WHERE user_id = ?
             ORDER BY target_date IS NULL, target_date ASC, id ASC",
            GOAL_COLUMNS
        ))
        .bind(owner)
        .fetch_all(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, owner: Owner, data: CreateSavingsGoal) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SavingsGoal>(&format!(
            "INSERT INTO savings_goals (user_id, name, target_amount, current_amount, target_date, color)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {}",
            GOAL_COLUMNS
        ))
        .bind(owner)
        .bind(data.name.trim())
        .bind(data.target_amount)
        .bind(data.current_amount.unwrap_or(0.0))
        .bind(data.target_date)
        .bind(data.color.unwrap_or_else(|| DEFAULT_GOAL_COLOR.to_string()))
        .fetch_one(pool)
        .await
    }

    /// Adds `amount` to the goal's current amount
    ///
    /// Returns None if the goal does not exist or is not the owner's.
    pub async fn contribute(
        pool: &SqlitePool,
        owner: Owner,
        id: i64,
        amount: f64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SavingsGoal>(&format!(
            "UPDATE savings_goals SET current_amount = current_amount + ?
             WHERE id = ? AND user_id = ?
             RETURNING {}",
            GOAL_COLUMNS
        ))
        .bind(amount)
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, owner: Owner, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM savings_goals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
