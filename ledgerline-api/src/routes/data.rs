/// Data management
///
/// - `GET /v1/data` - Up to 20 rows of each table the caller owns
/// - `DELETE /v1/data` - Wipe the caller's financial data, or with
///   `{"delete_user": true}` the whole user
///
/// Both flavours of `DELETE` end the session.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use ledgerline_shared::{
    auth::session::{self, AuthContext},
    data::{self, DataPreview, ResetSummary},
    models::{
        activity_log::{Action, ActivityLog},
        user::User,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    /// Also delete the user, their settings and activity log
    #[serde(default)]
    pub delete_user: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,

    /// None when the user was deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<ResetSummary>,
}

pub async fn preview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<DataPreview>> {
    let preview = data::preview(&state.db, auth.owner()).await?;
    Ok(Json(preview))
}

/// A missing or unreadable body is treated as a plain data reset
pub async fn reset(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    jar: CookieJar,
    body: Option<Json<ResetRequest>>,
) -> ApiResult<(CookieJar, Json<ResetResponse>)> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let jar = jar.add(session::expired_session_cookie(state.config.secure_cookies()));

    if req.delete_user {
        User::delete(&state.db, auth.user_id).await?;
        tracing::info!(user_id = auth.user_id, "User deleted their account");

        return Ok((
            jar,
            Json(ResetResponse {
                message: "Account Deleted".to_string(),
                removed: None,
            }),
        ));
    }

    let removed = data::reset(&state.db, auth.owner()).await?;
    ActivityLog::record(
        &state.db,
        auth.owner(),
        Action::DataReset,
        "User performed a full data reset",
    )
    .await;

    Ok((
        jar,
        Json(ResetResponse {
            message: "Data Reset Successful".to_string(),
            removed: Some(removed),
        }),
    ))
}
