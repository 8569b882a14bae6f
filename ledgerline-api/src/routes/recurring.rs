/// Recurring rule endpoints
///
/// - `GET /v1/recurring` - List, soonest next run first
/// - `POST /v1/recurring` - Create; the first run is due on the start date
/// - `DELETE /v1/recurring/:id` - Delete
/// - `POST /v1/recurring/process` - Post every due rule of the caller

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedJson,
    routes::DeleteResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use ledgerline_shared::{
    auth::session::AuthContext,
    models::{
        activity_log::{Action, ActivityLog},
        recurring_rule::{CreateRecurringRule, Frequency, RecurringRule},
        transaction::TransactionType,
    },
    recurring::{process_due_rules, ProcessSummary},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRuleRequest {
    pub account_id: i64,
    pub category_id: Option<i64>,

    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    pub frequency: Frequency,
    pub start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,

    #[serde(flatten)]
    pub summary: ProcessSummary,
}

pub async fn list_rules(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<RecurringRule>>> {
    let rules = RecurringRule::list(&state.db, auth.owner()).await?;
    Ok(Json(rules))
}

/// # Errors
///
/// - `404 Not Found`: Account or category is not the caller's
pub async fn create_rule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateRuleRequest>,
) -> ApiResult<(StatusCode, Json<RecurringRule>)> {
    let rule = RecurringRule::create(
        &state.db,
        auth.owner(),
        CreateRecurringRule {
            account_id: req.account_id,
            category_id: req.category_id,
            amount: req.amount,
            transaction_type: req.transaction_type,
            description: req.description.filter(|d| !d.trim().is_empty()),
            frequency: req.frequency,
            start_date: req.start_date,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn delete_rule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = RecurringRule::delete(&state.db, auth.owner(), id).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}

/// Runs the recurring processor for the caller
///
/// Each due rule posts one transaction dated on its due date and advances by
/// one period. Calling this twice on the same day posts nothing the second
/// time.
pub async fn process_rules(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProcessResponse>> {
    let summary = process_due_rules(&state.db, auth.owner(), state.today()).await?;

    let message = if summary.processed == 0 {
        "No due transactions".to_string()
    } else {
        ActivityLog::record(
            &state.db,
            auth.owner(),
            Action::ProcessRecurring,
            format!("Processed {} recurring transactions", summary.processed),
        )
        .await;
        format!("Processed {} recurring transactions", summary.processed)
    };

    Ok(Json(ProcessResponse { message, summary }))
}
