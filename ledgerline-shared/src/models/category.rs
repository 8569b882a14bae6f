/// Categories for tagging transactions and budgeting expenses
///
/// A category with `user_id = NULL` is a shared default: every user sees it
/// and may file transactions under it, but nobody can edit or delete it.
///
/// `spent` is not stored. Reads compute it as the sum of the caller's own
/// transactions in the category dated inside the current calendar month.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::transaction::TransactionType;
use crate::auth::authorization::Owner;
use crate::budget::BudgetSummary;
use crate::calendar::{month_start, next_month_start};

pub const DEFAULT_CATEGORY_COLOR: &str = "#64748b";
pub const DEFAULT_CATEGORY_ICON: &str = "circle";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,

    /// None for shared defaults
    pub user_id: Option<i64>,

    pub name: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub category_type: TransactionType,

    /// Monthly limit; 0 means no limit
    pub budget_limit: f64,

    pub color: String,
    pub icon: String,

    /// Spent in the current calendar month
    pub spent: f64,

    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn budget(&self) -> BudgetSummary {
        BudgetSummary::evaluate(self.budget_limit, self.spent)
    }
}

#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub category_type: TransactionType,
    pub budget_limit: Option<f64>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Budget edit; only limit and color are user-editable after creation
#[derive(Debug, Clone)]
pub struct UpdateCategoryBudget {
    pub budget_limit: f64,
    pub color: Option<String>,
}

const SELECT_WITH_SPENT: &str = r#"
    SELECT c.id, c.user_id, c.name, c.type, c.budget_limit, c.color, c.icon, c.created_at,
           COALESCE((
               SELECT SUM(t.amount) FROM transactions t
               WHERE t.category_id = c.id
                 AND t.user_id = ?
                 AND t.transaction_date >= ?
                 AND t.transaction_date < ?
           ), 0.0) AS spent
    FROM categories c
"#;

impl Category {
    /// Lists the owner's categories plus shared defaults, with spending for
    /// the month containing `today`
    pub async fn list(pool: &SqlitePool, owner: Owner, today: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "{} WHERE c.user_id = ? OR c.user_id IS NULL ORDER BY c.type, c.name, c.id",
            SELECT_WITH_SPENT
        ))
        .bind(owner)
        .bind(month_start(today))
        .bind(next_month_start(today))
        .bind(owner)
        .fetch_all(pool)
        .await
    }

    /// Finds a category visible to the owner (their own or shared)
    pub async fn find(
        pool: &SqlitePool,
        owner: Owner,
        id: i64,
        today: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "{} WHERE c.id = ? AND (c.user_id = ? OR c.user_id IS NULL)",
            SELECT_WITH_SPENT
        ))
        .bind(owner)
        .bind(month_start(today))
        .bind(next_month_start(today))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, owner: Owner, data: CreateCategory) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (user_id, name, type, budget_limit, color, icon)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, name, type, budget_limit, color, icon, created_at, 0.0 AS spent
            "#,
        )
        .bind(owner)
        .bind(data.name.trim())
        .bind(data.category_type)
        .bind(data.budget_limit.unwrap_or(0.0))
        .bind(data.color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()))
        .bind(data.icon.unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()))
        .fetch_one(pool)
        .await
    }

    /// Updates the budget limit and color of an owned category
    ///
    /// Returns None for missing, foreign and shared categories.
    pub async fn update_budget(
        pool: &SqlitePool,
        owner: Owner,
        id: i64,
        data: UpdateCategoryBudget,
        today: NaiveDate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE categories SET budget_limit = ?, color = COALESCE(?, color) WHERE id = ? AND user_id = ?",
        )
        .bind(data.budget_limit)
        .bind(data.color)
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find(pool, owner, id, today).await
    }

    /// Deletes an owned category; its transactions become uncategorized
    pub async fn delete(pool: &SqlitePool, owner: Owner, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
