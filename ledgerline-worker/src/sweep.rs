/// Cross-user recurring sweep
///
/// Runs the recurring processor once for every user that has at least one
/// due rule. Users are processed one after another; a failure for one user
/// is logged and counted, and the sweep moves on to the next.
///
/// The processor claims each occurrence with a compare-and-swap, so a sweep
/// overlapping an API-triggered run (or another sweep) never double-posts.

use chrono::NaiveDate;
use ledgerline_shared::{
    models::{
        activity_log::{Action, ActivityLog},
        recurring_rule::RecurringRule,
    },
    recurring::process_due_rules,
};
use sqlx::SqlitePool;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerSummary {
    /// Users with at least one due rule
    pub users: usize,

    /// Transactions posted
    pub processed: usize,

    /// Due rules claimed by a concurrent run
    pub skipped: usize,

    /// Users whose processing failed
    pub failed: usize,
}

/// Processes every due rule of every user as of `today`
///
/// # Errors
///
/// Fails only when the list of users cannot be read. Per-user failures are
/// reported in [`WorkerSummary::failed`].
pub async fn process_all_users(pool: &SqlitePool, today: NaiveDate) -> Result<WorkerSummary, sqlx::Error> {
    let owners = RecurringRule::owners_with_due_rules(pool, today).await?;

    let mut summary = WorkerSummary {
        users: owners.len(),
        ..Default::default()
    };

    tracing::info!(users = owners.len(), %today, "Starting recurring sweep");

    for owner in owners {
        match process_due_rules(pool, owner, today).await {
            Ok(result) => {
                summary.processed += result.processed;
                summary.skipped += result.skipped;

                if result.processed > 0 {
                    ActivityLog::record(
                        pool,
                        owner,
                        Action::ProcessRecurring,
                        format!("Processed {} recurring transactions", result.processed),
                    )
                    .await;
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(user_id = owner.user_id(), error = %e, "Recurring processing failed");
            }
        }
    }

    tracing::info!(
        users = summary.users,
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Recurring sweep finished"
    );

    Ok(summary)
}
