//! # Ledgerline Worker Library
//!
//! Sweeps every user's due recurring rules in one pass. The binary runs a
//! single sweep and exits; scheduling is left to an external cron.
//!
//! ## Modules
//!
//! - `config`: Environment configuration of the runner
//! - `sweep`: Processes due rules across all users
//!
//! ## Example
//!
//! ```no_run
//! use ledgerline_worker::sweep::process_all_users;
//!
//! # async fn example(pool: sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let today = chrono::Utc::now().date_naive();
//! let summary = process_all_users(&pool, today).await?;
//! println!("Posted {} transactions", summary.processed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod sweep;
