/// User model and database operations
///
/// Users own every other row. Registration runs in one database transaction
/// that also seeds a starter wallet and four categories, so a new user never
/// lands on an empty dashboard.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL UNIQUE COLLATE NOCASE,
///     password_hash TEXT NOT NULL,
///     created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
///     last_login_at DATETIME
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ledgerline_shared::models::user::{User, CreateUser};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// })
/// .await?;
///
/// let found = User::find_by_email(&pool, "ADA@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;

/// A registered user
///
/// The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address, stored lowercased
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub created_at: DateTime<Utc>,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Starter account created for every new user
const STARTER_ACCOUNT: (&str, &str, &str) = ("Cash Wallet", "WALLET", "#10b981");

/// Starter categories created for every new user: (name, type, icon)
const STARTER_CATEGORIES: [(&str, &str, &str); 4] = [
    ("Salary", "INCOME", "wallet"),
    ("Food", "EXPENSE", "utensils"),
    ("Rent", "EXPENSE", "home"),
    ("Shopping", "EXPENSE", "shopping-bag"),
];

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, last_login_at";

impl User {
    /// Ownership scope for queries made on behalf of this user
    pub fn owner(&self) -> Owner {
        Owner::new(self.id)
    }

    /// Creates a user together with their starter account and categories
    ///
    /// # Errors
    ///
    /// Returns a unique-constraint database error if the email is taken.
    pub async fn create(pool: &SqlitePool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(data.name.trim())
        .bind(normalize_email(&data.email))
        .bind(data.password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let (name, kind, color) = STARTER_ACCOUNT;
        sqlx::query("INSERT INTO accounts (user_id, name, type, balance, color) VALUES (?, ?, ?, 0.0, ?)")
            .bind(user.id)
            .bind(name)
            .bind(kind)
            .bind(color)
            .execute(&mut *tx)
            .await?;

        for (name, kind, icon) in STARTER_CATEGORIES {
            sqlx::query("INSERT INTO categories (user_id, name, type, icon) VALUES (?, ?, ?, ?)")
                .bind(user.id)
                .bind(name)
                .bind(kind)
                .bind(icon)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address, ignoring case
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    /// Checks whether an email address is already registered
    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
            .bind(normalize_email(email))
            .fetch_one(pool)
            .await
    }

    /// Records a successful login
    pub async fn update_last_login(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Deletes a user and, through cascading foreign keys, everything they own
    ///
    /// Returns true if the user existed.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether a user with this ID is still registered
    pub async fn exists(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}

/// Canonical form of an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
