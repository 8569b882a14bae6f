//! Recurring-rule processor.
//!
//! For every active rule of a user whose `next_run_date` is on or before
//! today, the processor posts one transaction dated on that due date and
//! moves `next_run_date` forward by exactly one period. A rule that is
//! several periods behind catches up one period per run.
//!
//! Each rule is handled in its own database transaction. The rule is first
//! claimed with a compare-and-swap on `next_run_date`; only the claim that
//! still sees the old date inserts the transaction. A second run racing the
//! first, or a repeated run on the same day, therefore never posts the same
//! occurrence twice. A failure part way through keeps the rules that were
//! already committed.
//!
//! Nothing here schedules itself. The API exposes a per-user trigger and the
//! `ledgerline-worker` binary sweeps every user when run by cron.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::authorization::Owner;
use crate::models::recurring_rule::RecurringRule;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Outcome of one processor run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSummary {
    /// Rules that posted a transaction
    pub processed: usize,

    /// Due rules that another run claimed first
    pub skipped: usize,
}

/// Processes every due rule of one user
pub async fn process_due_rules(
    pool: &SqlitePool,
    owner: Owner,
    today: NaiveDate,
) -> Result<ProcessSummary, ProcessError> {
    let due = RecurringRule::due(pool, owner, today).await?;
    let mut summary = ProcessSummary::default();

    for rule in &due {
        if process_rule(pool, rule).await? {
            summary.processed += 1;
        } else {
            summary.skipped += 1;
        }
    }

    if summary.processed > 0 {
        info!(
            user_id = owner.user_id(),
            processed = summary.processed,
            skipped = summary.skipped,
            "Recurring rules processed"
        );
    }

    Ok(summary)
}

/// Claims and realizes one occurrence of `rule`
///
/// Returns false when the claim was lost.
async fn process_rule(pool: &SqlitePool, rule: &RecurringRule) -> Result<bool, sqlx::Error> {
    let due_date = rule.next_run_date;
    let next_run = rule.frequency.advance(due_date);

    let mut tx = pool.begin().await?;

    let claimed = sqlx::query(
        r#"
        UPDATE recurring_rules
        SET next_run_date = ?
        WHERE id = ? AND user_id = ? AND next_run_date = ? AND is_active = 1
        "#,
    )
    .bind(next_run)
    .bind(rule.id)
    .bind(rule.user_id)
    .bind(due_date)
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        tx.rollback().await?;
        debug!(rule_id = rule.id, "Recurring rule already claimed");
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO transactions
            (user_id, account_id, category_id, amount, type, description, transaction_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(rule.user_id)
    .bind(rule.account_id)
    .bind(rule.category_id)
    .bind(rule.amount)
    .bind(rule.transaction_type)
    .bind(rule.description.as_deref())
    .bind(due_date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    debug!(
        rule_id = rule.id,
        due_date = %due_date,
        next_run_date = %next_run,
        "Recurring rule realized"
    );

    Ok(true)
}
