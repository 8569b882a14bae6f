/// Transaction endpoints
///
/// - `GET /v1/transactions` - Filtered list, newest first
/// - `POST /v1/transactions` - Create
/// - `GET /v1/transactions/:id` - Fetch one
/// - `PUT /v1/transactions/:id` - Overwrite
/// - `DELETE /v1/transactions/:id` - Delete
/// - `POST /v1/transactions/import` - Bulk insert from CSV
/// - `GET /v1/transactions/export` - Download every transaction as CSV
///
/// Account and category ids in a request must belong to the caller (shared
/// categories are allowed); anything else is answered with `404`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::DeleteResponse,
};
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::NaiveDate;
use ledgerline_shared::{
    auth::session::AuthContext,
    csv_io,
    models::{
        activity_log::{Action, ActivityLog},
        transaction::{
            Transaction, TransactionFilter, TransactionInput, TransactionType, DEFAULT_LIST_LIMIT,
            MAX_LIST_LIMIT, MAX_RECEIPT_BYTES,
        },
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,

    /// Defaults to 50, capped at 500
    pub limit: Option<i64>,
}

impl From<ListQuery> for TransactionFilter {
    fn from(query: ListQuery) -> Self {
        TransactionFilter {
            transaction_type: query.transaction_type,
            account_id: query.account_id,
            category_id: query.category_id,
            search: query.search,
            start_date: query.start_date,
            end_date: query.end_date,
            limit: Some(query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)),
        }
    }
}

/// Create and update request
#[derive(Debug, Deserialize, Validate)]
pub struct TransactionRequest {
    pub account_id: i64,
    pub category_id: Option<i64>,

    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(alias = "date")]
    pub transaction_date: NaiveDate,

    /// Base64 receipt image
    pub receipt_data: Option<String>,
}

impl TransactionRequest {
    fn into_input(self) -> ApiResult<TransactionInput> {
        if let Some(receipt) = &self.receipt_data {
            if receipt.len() > MAX_RECEIPT_BYTES {
                return Err(ApiError::BadRequest("Receipt image must be at most 2 MiB".to_string()));
            }
        }

        Ok(TransactionInput {
            account_id: self.account_id,
            category_id: self.category_id,
            amount: self.amount,
            transaction_type: self.transaction_type,
            description: self.description.filter(|d| !d.trim().is_empty()),
            transaction_date: self.transaction_date,
            receipt_data: self.receipt_data.filter(|r| !r.is_empty()),
        })
    }
}

/// CSV import request
#[derive(Debug, Deserialize, Validate)]
pub struct ImportRequest {
    /// Account every imported row is posted to
    pub account_id: i64,

    /// Category for every imported row, if any
    pub category_id: Option<i64>,

    /// Raw CSV document
    #[validate(length(min = 1, message = "No transactions found"))]
    pub csv: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let transactions = Transaction::list(&state.db, auth.owner(), &query.into()).await?;
    Ok(Json(transactions))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Transaction>> {
    let transaction = Transaction::find(&state.db, auth.owner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    Ok(Json(transaction))
}

/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `404 Not Found`: Account or category is not the caller's
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = Transaction::create(&state.db, auth.owner(), req.into_input()?).await?;

    ActivityLog::record(
        &state.db,
        auth.owner(),
        Action::CreateTransaction,
        format!(
            "Added {}: {} ({:.2})",
            transaction.transaction_type.as_str(),
            transaction.description.as_deref().unwrap_or("No description"),
            transaction.amount
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<TransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    let transaction = Transaction::update(&state.db, auth.owner(), id, req.into_input()?)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    ActivityLog::record(
        &state.db,
        auth.owner(),
        Action::UpdateTransaction,
        format!("Updated transaction #{}", id),
    )
    .await;

    Ok(Json(transaction))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Transaction::delete(&state.db, auth.owner(), id).await?;

    if deleted {
        ActivityLog::record(
            &state.db,
            auth.owner(),
            Action::DeleteTransaction,
            format!("Deleted transaction #{}", id),
        )
        .await;
    }

    Ok(Json(DeleteResponse::new(deleted)))
}

/// Imports a CSV document into one account
///
/// All rows are inserted in a single database transaction: a bad row or a
/// foreign account/category leaves nothing behind.
///
/// # Errors
///
/// - `400 Bad Request`: Empty file, missing `Amount` column, or a row with
///   a zero or unparsable amount (the message names the line)
/// - `404 Not Found`: Account or category is not the caller's
pub async fn import_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<ImportRequest>,
) -> ApiResult<Json<ImportResponse>> {
    let rows = csv_io::parse_import(&req.csv, state.today())?;

    let inputs: Vec<TransactionInput> = rows
        .into_iter()
        .map(|row| TransactionInput {
            account_id: req.account_id,
            category_id: req.category_id,
            amount: row.amount,
            transaction_type: row.transaction_type,
            description: Some(row.description),
            transaction_date: row.date,
            receipt_data: None,
        })
        .collect();

    let imported = Transaction::create_many(&state.db, auth.owner(), inputs).await?;

    ActivityLog::record(
        &state.db,
        auth.owner(),
        Action::ImportTransactions,
        format!("Imported {} transactions", imported),
    )
    .await;
    tracing::info!(user_id = auth.user_id, imported, "CSV import completed");

    Ok(Json(ImportResponse {
        message: format!("Successfully imported {} transactions", imported),
        imported,
    }))
}

/// Downloads every transaction of the caller as `transactions_<date>.csv`
pub async fn export_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<impl IntoResponse> {
    let transactions = Transaction::list(&state.db, auth.owner(), &TransactionFilter::default()).await?;
    let body = csv_io::write_export(&transactions)?;

    let disposition = format!(
        "attachment; filename=\"transactions_{}.csv\"",
        state.today().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
