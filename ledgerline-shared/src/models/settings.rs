/// Per-user localization settings
///
/// One row per user. Reading settings for a user without a row inserts the
/// defaults first, so callers always get a complete record back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;

/// Upper bound on `decimals`; larger values are clamped on write
pub const MAX_DECIMALS: i64 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Settings {
    pub user_id: i64,

    /// ISO 3166 country code
    pub country: String,

    /// ISO 4217 currency code
    pub currency: String,

    pub currency_symbol: String,

    /// Digits shown after the decimal point, 0..=4
    pub decimals: i64,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateSettings {
    pub country: String,
    pub currency: String,
    pub currency_symbol: String,
    pub decimals: i64,
}

const SETTINGS_COLUMNS: &str = "user_id, country, currency, currency_symbol, decimals, updated_at";

impl Settings {
    /// Returns the owner's settings, creating the default row on first read
    pub async fn get_or_create(pool: &SqlitePool, owner: Owner) -> Result<Self, sqlx::Error> {
        sqlx::query("INSERT INTO settings (user_id) VALUES (?) ON CONFLICT (user_id) DO NOTHING")
            .bind(owner)
            .execute(pool)
            .await?;

        sqlx::query_as::<_, Settings>(&format!("SELECT {} FROM settings WHERE user_id = ?", SETTINGS_COLUMNS))
            .bind(owner)
            .fetch_one(pool)
            .await
    }

    /// Inserts or overwrites the owner's settings
    pub async fn upsert(pool: &SqlitePool, owner: Owner, data: UpdateSettings) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Settings>(&format!(
            r#"
            INSERT INTO settings (user_id, country, currency, currency_symbol, decimals, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                country = excluded.country,
                currency = excluded.currency,
                currency_symbol = excluded.currency_symbol,
                decimals = excluded.decimals,
                updated_at = excluded.updated_at
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        ))
        .bind(owner)
        .bind(data.country.trim().to_uppercase())
        .bind(data.currency.trim().to_uppercase())
        .bind(data.currency_symbol)
        .bind(data.decimals.clamp(0, MAX_DECIMALS))
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }
}
