/// Recurring rules: templates that turn into transactions on a cadence
///
/// A rule is created with `next_run_date = start_date`. Only the processor in
/// [`crate::recurring`] moves `next_run_date` forward; users can create and
/// delete rules but not edit them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::transaction::TransactionType;
use crate::auth::authorization::{require_owned, require_owned_opt, AuthzError, OwnedResource, Owner};
use crate::calendar::{add_days, add_months};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The occurrence one period after `date`
    ///
    /// Month and year steps clamp to the end of shorter months.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => add_days(date, 1),
            Frequency::Weekly => add_days(date, 7),
            Frequency::Monthly => add_months(date, 1),
            Frequency::Yearly => add_months(date, 12),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecurringRule {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,

    /// Date the next transaction will carry
    pub next_run_date: NaiveDate,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateRecurringRule {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
}

const SELECT_JOINED: &str = r#"
    SELECT r.id, r.user_id, r.account_id, r.category_id, r.amount, r.type, r.description,
           r.frequency, r.start_date, r.next_run_date, r.is_active, r.created_at,
           c.name AS category_name, a.name AS account_name
    FROM recurring_rules r
    JOIN accounts a ON a.id = r.account_id
    LEFT JOIN categories c ON c.id = r.category_id
"#;

impl RecurringRule {
    /// Lists the owner's rules, soonest first
    pub async fn list(pool: &SqlitePool, owner: Owner) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RecurringRule>(&format!(
            "{} WHERE r.user_id = ? ORDER BY r.next_run_date ASC, r.id ASC",
            SELECT_JOINED
        ))
        .bind(owner)
        .fetch_all(pool)
        .await
    }

    /// Active rules whose next run is on or before `today`
    pub async fn due(pool: &SqlitePool, owner: Owner, today: NaiveDate) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RecurringRule>(&format!(
            "{} WHERE r.user_id = ? AND r.is_active = 1 AND r.next_run_date <= ? ORDER BY r.next_run_date ASC, r.id ASC",
            SELECT_JOINED
        ))
        .bind(owner)
        .bind(today)
        .fetch_all(pool)
        .await
    }

    /// Active expense rules falling due within `[from, until]`
    pub async fn upcoming_expenses(
        pool: &SqlitePool,
        owner: Owner,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, RecurringRule>(&format!(
            "{} WHERE r.user_id = ? AND r.is_active = 1 AND r.type = 'EXPENSE'
               AND r.next_run_date >= ? AND r.next_run_date <= ?
             ORDER BY r.next_run_date ASC, r.id ASC",
            SELECT_JOINED
        ))
        .bind(owner)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    /// Every user with at least one due rule
    pub async fn owners_with_due_rules(pool: &SqlitePool, today: NaiveDate) -> Result<Vec<Owner>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT user_id FROM recurring_rules WHERE is_active = 1 AND next_run_date <= ? ORDER BY user_id",
        )
        .bind(today)
        .fetch_all(pool)
        .await
    }

    pub async fn find(pool: &SqlitePool, owner: Owner, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, RecurringRule>(&format!("{} WHERE r.id = ? AND r.user_id = ?", SELECT_JOINED))
            .bind(id)
            .bind(owner)
            .fetch_optional(pool)
            .await
    }

    /// Creates an active rule whose first run is `start_date`
    pub async fn create(pool: &SqlitePool, owner: Owner, data: CreateRecurringRule) -> Result<Self, AuthzError> {
        require_owned(pool, owner, OwnedResource::Account, data.account_id).await?;
        require_owned_opt(pool, owner, OwnedResource::Category, data.category_id).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO recurring_rules
                (user_id, account_id, category_id, amount, type, description, frequency,
                 start_date, next_run_date, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(data.account_id)
        .bind(data.category_id)
        .bind(data.amount)
        .bind(data.transaction_type)
        .bind(data.description)
        .bind(data.frequency)
        .bind(data.start_date)
        .bind(data.start_date)
        .fetch_one(pool)
        .await?;

        tracing::debug!(user_id = owner.user_id(), rule_id = id, "Recurring rule created");

        Self::find(pool, owner, id)
            .await?
            .ok_or(AuthzError::DatabaseError(sqlx::Error::RowNotFound))
    }

    pub async fn delete(pool: &SqlitePool, owner: Owner, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM recurring_rules WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
