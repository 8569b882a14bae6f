/// Transactions: single dated income or expense entries
///
/// Amounts are always stored positive; `type` carries the direction. Reads
/// join the account and category names so lists and exports need no second
/// lookup. A transaction whose category was deleted keeps its row with
/// `category_id = NULL`.
///
/// Account and category ids inside an input are checked with
/// [`require_owned`] before anything is written, which is why the mutating
/// functions here return [`AuthzError`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::auth::authorization::{require_owned, require_owned_opt, AuthzError, OwnedResource, Owner};

/// Upper bound on the base64 receipt image, in bytes of text
pub const MAX_RECEIPT_BYTES: usize = 2 * 1024 * 1024;

/// Default and maximum page sizes for listings
pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,

    /// Base64 image of the receipt, if one was attached
    pub receipt_data: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Joined from categories; None when uncategorized
    pub category_name: Option<String>,

    /// Joined from accounts
    pub account_name: String,
}

/// Input for creating or overwriting a transaction
#[derive(Debug, Clone)]
pub struct TransactionInput {
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub receipt_data: Option<String>,
}

/// Optional filters for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,

    /// Substring match on the description
    pub search: Option<String>,

    /// Inclusive lower bound on the transaction date
    pub start_date: Option<NaiveDate>,

    /// Inclusive upper bound on the transaction date
    pub end_date: Option<NaiveDate>,

    /// None returns every matching row
    pub limit: Option<i64>,
}

const SELECT_JOINED: &str = r#"
    SELECT t.id, t.user_id, t.account_id, t.category_id, t.amount, t.type, t.description,
           t.transaction_date, t.receipt_data, t.created_at,
           c.name AS category_name, a.name AS account_name
    FROM transactions t
    JOIN accounts a ON a.id = t.account_id
    LEFT JOIN categories c ON c.id = t.category_id
"#;

impl Transaction {
    /// Lists the owner's transactions, newest first
    pub async fn list(
        pool: &SqlitePool,
        owner: Owner,
        filter: &TransactionFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(SELECT_JOINED);
        query.push(" WHERE t.user_id = ").push_bind(owner);

        if let Some(kind) = filter.transaction_type {
            query.push(" AND t.type = ").push_bind(kind);
        }
        if let Some(account_id) = filter.account_id {
            query.push(" AND t.account_id = ").push_bind(account_id);
        }
        if let Some(category_id) = filter.category_id {
            query.push(" AND t.category_id = ").push_bind(category_id);
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query
                .push(" AND t.description LIKE ")
                .push_bind(like_pattern(search.trim()))
                .push(" ESCAPE '\\'");
        }
        if let Some(start) = filter.start_date {
            query.push(" AND t.transaction_date >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND t.transaction_date <= ").push_bind(end);
        }

        query.push(" ORDER BY t.transaction_date DESC, t.id DESC");

        if let Some(limit) = filter.limit {
            query.push(" LIMIT ").push_bind(limit);
        }

        let rows = query.build_query_as::<Transaction>().fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn find(pool: &SqlitePool, owner: Owner, id: i64) -> Result<Option<Self>, sqlx::Error> {
        Self::find_in(&mut *pool.acquire().await?, owner, id).await
    }

    async fn find_in(conn: &mut SqliteConnection, owner: Owner, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Transaction>(&format!("{} WHERE t.id = ? AND t.user_id = ?", SELECT_JOINED))
            .bind(id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }

    /// Creates a transaction after checking the account and category belong
    /// to the owner
    pub async fn create(pool: &SqlitePool, owner: Owner, data: TransactionInput) -> Result<Self, AuthzError> {
        let mut tx = pool.begin().await?;

        let id = insert(&mut tx, owner, data).await?;
        let created = Self::find_in(&mut tx, owner, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;
        Ok(created)
    }

    /// Inserts many transactions atomically
    ///
    /// Either every row is written or none is. Returns the number of rows.
    pub async fn create_many(
        pool: &SqlitePool,
        owner: Owner,
        rows: Vec<TransactionInput>,
    ) -> Result<usize, AuthzError> {
        let mut tx = pool.begin().await?;
        let count = rows.len();

        for data in rows {
            insert(&mut tx, owner, data).await?;
        }

        tx.commit().await?;
        Ok(count)
    }

    /// Overwrites every field of an owned transaction
    ///
    /// Returns None if the transaction does not exist or is not the owner's.
    pub async fn update(
        pool: &SqlitePool,
        owner: Owner,
        id: i64,
        data: TransactionInput,
    ) -> Result<Option<Self>, AuthzError> {
        let mut tx = pool.begin().await?;

        check_references(&mut tx, owner, &data).await?;

        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET account_id = ?, category_id = ?, amount = ?, type = ?, description = ?,
                transaction_date = ?, receipt_data = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(data.account_id)
        .bind(data.category_id)
        .bind(data.amount)
        .bind(data.transaction_type)
        .bind(data.description)
        .bind(data.transaction_date)
        .bind(data.receipt_data)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let updated = Self::find_in(&mut tx, owner, id).await?;
        tx.commit().await?;

        Ok(updated)
    }

    pub async fn delete(pool: &SqlitePool, owner: Owner, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(owner)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn check_references(
    conn: &mut SqliteConnection,
    owner: Owner,
    data: &TransactionInput,
) -> Result<(), AuthzError> {
    require_owned(&mut *conn, owner, OwnedResource::Account, data.account_id).await?;
    require_owned_opt(&mut *conn, owner, OwnedResource::Category, data.category_id).await
}

/// Checks references and inserts one row, returning its id
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    owner: Owner,
    data: TransactionInput,
) -> Result<i64, AuthzError> {
    check_references(conn, owner, &data).await?;

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO transactions
            (user_id, account_id, category_id, amount, type, description, transaction_date, receipt_data)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(owner)
    .bind(data.account_id)
    .bind(data.category_id)
    .bind(data.amount)
    .bind(data.transaction_type)
    .bind(data.description)
    .bind(data.transaction_date)
    .bind(data.receipt_data)
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

/// `%text%` with LIKE wildcards in `text` escaped by `\\`
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
