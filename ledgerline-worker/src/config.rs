/// Configuration of the recurring-rule runner
///
/// # Environment Variables
///
/// - `DATABASE_URL`: SQLite connection string (default: sqlite://ledgerline.db?mode=rwc)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 2)
/// - `WORKER_RUN_DATE`: Process as if today were this `YYYY-MM-DD` date
/// - `RUST_LOG`: Log filter

use chrono::{NaiveDate, Utc};
use std::env;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ledgerline.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// SQLite connection URL
    pub database_url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Date override for catching up a missed run
    pub run_date: Option<NaiveDate>,
}

impl WorkerConfig {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or date variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<u32>()?;

        let run_date = match env::var("WORKER_RUN_DATE") {
            Ok(raw) => Some(parse_run_date(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            database_url,
            max_connections,
            run_date,
        })
    }

    /// The date rules are processed against
    pub fn today(&self) -> NaiveDate {
        self.run_date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

fn parse_run_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("WORKER_RUN_DATE must be a YYYY-MM-DD date, got {:?}", raw))
}
