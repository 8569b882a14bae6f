/// Account endpoints
///
/// - `GET /v1/accounts` - List, newest first
/// - `POST /v1/accounts` - Create
/// - `PUT /v1/accounts/:id` - Overwrite name, type, balance and color
/// - `DELETE /v1/accounts/:id` - Delete (cascades to transactions and rules)
///
/// The balance is whatever the user last entered; posting transactions does
/// not move it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
    routes::DeleteResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use ledgerline_shared::{
    auth::session::AuthContext,
    models::account::{Account, AccountInput, AccountType},
};
use serde::Deserialize;
use validator::Validate;

/// Create and update request
#[derive(Debug, Deserialize, Validate)]
pub struct AccountRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub balance: f64,

    #[validate(length(min = 1, max = 32, message = "Invalid color"))]
    pub color: Option<String>,
}

impl From<AccountRequest> for AccountInput {
    fn from(req: AccountRequest) -> Self {
        AccountInput {
            name: req.name,
            account_type: req.account_type,
            balance: req.balance,
            color: req.color,
        }
    }
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Account>>> {
    let accounts = Account::list(&state.db, auth.owner()).await?;
    Ok(Json(accounts))
}

pub async fn create_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<AccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = Account::create(&state.db, auth.owner(), req.into()).await?;

    tracing::debug!(user_id = auth.user_id, account_id = account.id, "Account created");

    Ok((StatusCode::CREATED, Json(account)))
}

/// # Errors
///
/// - `404 Not Found`: No such account for the caller
pub async fn update_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<AccountRequest>,
) -> ApiResult<Json<Account>> {
    let account = Account::update(&state.db, auth.owner(), id, req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(account))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Account::delete(&state.db, auth.owner(), id).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
