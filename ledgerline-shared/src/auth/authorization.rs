/// Ownership scope and cross-entity authorization
///
/// Every row in Ledgerline belongs to exactly one user (shared default
/// categories excepted). Model functions take an [`Owner`] instead of a bare
/// user id, so a query cannot be written without the owner filter, and ids
/// that arrive inside request bodies (an account on a transaction, a category
/// on a rule) are checked with [`require_owned`] before they are written.
///
/// # Example
///
/// ```no_run
/// use ledgerline_shared::auth::authorization::{require_owned, Owner, OwnedResource};
/// use sqlx::SqlitePool;
///
/// # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
/// let owner = Owner::new(1);
/// require_owned(&pool, owner, OwnedResource::Account, 42).await?;
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use sqlx::SqliteExecutor;
use std::fmt;

/// The user on whose behalf a query runs
///
/// Binds as the bare user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Owner(i64);

impl Owner {
    pub fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    pub fn user_id(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resources that can be referenced by id from another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedResource {
    /// Must belong to the caller
    Account,

    /// Must belong to the caller or be a shared default
    Category,
}

impl OwnedResource {
    pub fn label(&self) -> &'static str {
        match self {
            OwnedResource::Account => "Account",
            OwnedResource::Category => "Category",
        }
    }
}

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The referenced row does not exist or belongs to someone else
    #[error("{} not found", .resource.label())]
    NotFound { resource: OwnedResource, id: i64 },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that `id` names a row the caller may reference
///
/// Foreign rows are reported exactly like missing rows.
///
/// # Errors
///
/// Returns `AuthzError::NotFound` when the row is missing or foreign.
pub async fn require_owned<'e, E>(
    executor: E,
    owner: Owner,
    resource: OwnedResource,
    id: i64,
) -> Result<(), AuthzError>
where
    E: SqliteExecutor<'e>,
{
    let query = match resource {
        OwnedResource::Account => {
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE id = ? AND user_id = ?)"
        }
        OwnedResource::Category => {
            "SELECT EXISTS (SELECT 1 FROM categories WHERE id = ? AND (user_id = ? OR user_id IS NULL))"
        }
    };

    let exists: bool = sqlx::query_scalar(query)
        .bind(id)
        .bind(owner)
        .fetch_one(executor)
        .await?;

    if !exists {
        tracing::debug!(user_id = owner.user_id(), id, resource = resource.label(), "Reference rejected");
        return Err(AuthzError::NotFound { resource, id });
    }

    Ok(())
}

/// Checks an optional reference, passing `None` through
pub async fn require_owned_opt<'e, E>(
    executor: E,
    owner: Owner,
    resource: OwnedResource,
    id: Option<i64>,
) -> Result<(), AuthzError>
where
    E: SqliteExecutor<'e>,
{
    match id {
        Some(id) => require_owned(executor, owner, resource, id).await,
        None => Ok(()),
    }
}
