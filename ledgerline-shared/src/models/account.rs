/// Accounts: wallets, bank accounts, cards and investment pots
///
/// `balance` is a stored figure the user maintains by hand. Posting a
/// transaction does not move it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;

pub const DEFAULT_ACCOUNT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum AccountType {
    Cash,
    Bank,
    Credit,
    Wallet,
    Investment,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub account_type: AccountType,
    pub balance: f64,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or overwriting an account
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
    pub color: Option<String>,
}

const ACCOUNT_COLUMNS: &str = "id, user_id, name, type, balance, color, created_at";

impl Account {
    /// Lists the owner's accounts, newest first
    pub async fn list(pool: &SqlitePool, owner: Owner) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            ACCOUNT_COLUMNS
        ))
        .bind(owner)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &SqlitePool, owner: Owner, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {} FROM accounts WHERE id = ? AND user_id = ?",
            ACCOUNT_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, owner: Owner, data: AccountInput) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (user_id, name, type, balance, color) VALUES (?, ?, ?, ?, ?) RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(owner)
        .bind(data.name.trim())
        .bind(data.account_type)
        .bind(data.balance)
        .bind(data.color.unwrap_or_else(|| DEFAULT_ACCOUNT_COLOR.to_string()))
        .fetch_one(pool)
        .await
    }

    /// Overwrites name, type, balance and color
    ///
    /// Returns None if the account does not exist or is not the owner's. A
    /// missing color keeps the current one.
    pub async fn update(
        pool: &SqlitePool,
        owner: Owner,
        id: i64,
        data: AccountInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET name = ?, type = ?, balance = ?, color = COALESCE(?, color)
             WHERE id = ? AND user_id = ?
             RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(data.name.trim())
        .bind(data.account_type)
        .bind(data.balance)
        .bind(data.color)
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an account along with its transactions and recurring rules
    pub async fn delete(pool: &SqlitePool, owner: Owner, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sum of all the owner's account balances
    pub async fn net_worth(pool: &SqlitePool, owner: Owner) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0.0) FROM accounts WHERE user_id = ?")
            .bind(owner)
            .fetch_one(pool)
            .await
    }
}
