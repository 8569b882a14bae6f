/// Append-only audit trail of user actions
///
/// Logging an action must never break the action itself, so [`ActivityLog::record`]
/// swallows database errors after reporting them at `warn`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::authorization::Owner;

/// Number of entries returned by [`ActivityLog::recent`]
pub const RECENT_LIMIT: i64 = 50;

/// Actions written to the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Logout,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    ImportTransactions,
    ProcessRecurring,
    DataReset,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Login => "LOGIN",
            Action::Logout => "LOGOUT",
            Action::CreateTransaction => "CREATE_TRANSACTION",
            Action::UpdateTransaction => "UPDATE_TRANSACTION",
            Action::DeleteTransaction => "DELETE_TRANSACTION",
            Action::ImportTransactions => "IMPORT_TRANSACTIONS",
            Action::ProcessRecurring => "PROCESS_RECURRING",
            Action::DataReset => "DATA_RESET",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Appends an entry, logging and discarding any failure
    pub async fn record(pool: &SqlitePool, owner: Owner, action: Action, details: impl Into<String>) {
        let result = sqlx::query("INSERT INTO activity_logs (user_id, action, details) VALUES (?, ?, ?)")
            .bind(owner)
            .bind(action.as_str())
            .bind(details.into())
            .execute(pool)
            .await;

        if let Err(e) = result {
            tracing::warn!(
                user_id = owner.user_id(),
                action = action.as_str(),
                error = %e,
                "Failed to write activity log"
            );
        }
    }

    /// Latest entries, newest first
    pub async fn recent(pool: &SqlitePool, owner: Owner) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, user_id, action, details, created_at
            FROM activity_logs
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(owner)
        .bind(RECENT_LIMIT)
        .fetch_all(pool)
        .await
    }
}
