//! # Ledgerline Shared Library
//!
//! Domain types, persistence and business logic shared by the Ledgerline API
//! server and the recurring-transaction worker.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens and ownership checks
//! - `db`: Connection pool and embedded migrations
//! - `models`: Database models, one per table
//! - `recurring`: Realizes due recurring rules into transactions
//! - `stats`: Dashboard aggregates
//! - `budget`: Budget status of a category
//! - `csv_io`: CSV import parsing and export rendering
//! - `data`: Preview and reset of everything a user owns
//! - `calendar`: Month-aware date arithmetic

pub mod auth;
pub mod budget;
pub mod calendar;
pub mod csv_io;
pub mod data;
pub mod db;
pub mod models;
pub mod recurring;
pub mod stats;

/// Current version of the Ledgerline shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
