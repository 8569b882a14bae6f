/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout and the current user
/// - `accounts`, `categories`, `transactions`, `recurring`, `goals`: CRUD
/// - `settings`: Per-user localization
/// - `activity`: Audit trail
/// - `stats`: Dashboard aggregates
/// - `data`: Data preview and reset

pub mod accounts;
pub mod activity;
pub mod auth;
pub mod categories;
pub mod data;
pub mod goals;
pub mod health;
pub mod recurring;
pub mod settings;
pub mod stats;
pub mod transactions;

use serde::{Deserialize, Serialize};

/// Body returned by every delete endpoint
///
/// Deleting a row that does not exist (or is someone else's) is not an
/// error; `deleted` is simply false.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

impl DeleteResponse {
    pub fn new(deleted: bool) -> Self {
        Self { deleted }
    }
}
