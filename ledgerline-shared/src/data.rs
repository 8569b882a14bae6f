//! Operations over everything one user owns
//!
//! The preview gives a capped look at each table so a user can see what a
//! reset would remove. A reset wipes the financial data but keeps the login,
//! settings and activity log; deleting the user goes through
//! [`User::delete`](crate::models::user::User::delete) and its cascades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;
use crate::models::account::AccountType;
use crate::models::recurring_rule::Frequency;
use crate::models::transaction::TransactionType;

/// Rows shown per table in the preview
pub const PREVIEW_LIMIT: i64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TransactionPreview {
    pub id: i64,
    pub transaction_date: NaiveDate,
    pub description: Option<String>,
    pub amount: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountPreview {
    pub id: i64,
    pub name: String,
    pub balance: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryPreview {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub category_type: TransactionType,
    pub budget_limit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GoalPreview {
    pub id: i64,
    pub name: String,
    pub current_amount: f64,
    pub target_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RulePreview {
    pub id: i64,
    pub description: Option<String>,
    pub amount: f64,
    pub frequency: Frequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreview {
    pub transactions: Vec<TransactionPreview>,
    pub accounts: Vec<AccountPreview>,
    pub categories: Vec<CategoryPreview>,
    pub savings_goals: Vec<GoalPreview>,
    pub recurring_rules: Vec<RulePreview>,
}

/// Rows removed by [`reset`], per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub transactions: u64,
    pub recurring_rules: u64,
    pub savings_goals: u64,
    pub accounts: u64,
    pub categories: u64,
}

/// Up to [`PREVIEW_LIMIT`] rows of each table the owner has data in
pub async fn preview(pool: &SqlitePool, owner: Owner) -> Result<DataPreview, sqlx::Error> {
    let transactions = sqlx::query_as::<_, TransactionPreview>(
        "SELECT id, transaction_date, description, amount, type FROM transactions
         WHERE user_id = ? ORDER BY transaction_date DESC, id DESC LIMIT ?",
    )
    .bind(owner)
    .bind(PREVIEW_LIMIT)
    .fetch_all(pool)
    .await?;

    let accounts = sqlx::query_as::<_, AccountPreview>(
        "SELECT id, name, balance, type FROM accounts WHERE user_id = ? ORDER BY id LIMIT ?",
    )
    .bind(owner)
    .bind(PREVIEW_LIMIT)
    .fetch_all(pool)
    .await?;

    let categories = sqlx::query_as::<_, CategoryPreview>(
        "SELECT id, name, type, budget_limit FROM categories WHERE user_id = ? ORDER BY id LIMIT ?",
    )
    .bind(owner)
    .bind(PREVIEW_LIMIT)
    .fetch_all(pool)
    .await?;

    let savings_goals = sqlx::query_as::<_, GoalPreview>(
        "SELECT id, name, current_amount, target_amount FROM savings_goals WHERE user_id = ? ORDER BY id LIMIT ?",
    )
    .bind(owner)
    .bind(PREVIEW_LIMIT)
    .fetch_all(pool)
    .await?;

    let recurring_rules = sqlx::query_as::<_, RulePreview>(
        "SELECT id, description, amount, frequency FROM recurring_rules WHERE user_id = ? ORDER BY id LIMIT ?",
    )
    .bind(owner)
    .bind(PREVIEW_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(DataPreview {
        transactions,
        accounts,
        categories,
        savings_goals,
        recurring_rules,
    })
}

/// Deletes all financial data of the owner in one database transaction
///
/// Shared default categories are untouched.
pub async fn reset(pool: &SqlitePool, owner: Owner) -> Result<ResetSummary, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut summary = ResetSummary::default();

    // Children before parents
    for (table, counter) in [
        ("transactions", &mut summary.transactions),
        ("recurring_rules", &mut summary.recurring_rules),
        ("savings_goals", &mut summary.savings_goals),
        ("accounts", &mut summary.accounts),
        ("categories", &mut summary.categories),
    ] {
        *counter = sqlx::query(&format!("DELETE FROM {} WHERE user_id = ?", table))
            .bind(owner)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;

    tracing::info!(user_id = owner.user_id(), ?summary, "User data reset");

    Ok(summary)
}
