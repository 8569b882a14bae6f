//! # Ledgerline Worker
//!
//! Posts every due recurring transaction for every user, then exits.
//! Meant to be run daily by cron or a systemd timer.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p ledgerline-worker
//! WORKER_RUN_DATE=2024-03-01 cargo run -p ledgerline-worker
//! ```

use ledgerline_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use ledgerline_worker::{config::WorkerConfig, sweep::process_all_users};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerline_worker=debug,ledgerline_shared=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Ledgerline Worker v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database_url.clone(),
        max_connections: config.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let summary = process_all_users(&pool, config.today()).await;
    close_pool(pool).await;

    let summary = summary?;
    if summary.failed > 0 {
        anyhow::bail!("Recurring processing failed for {} users", summary.failed);
    }

    Ok(())
}
