/// Activity log
///
/// - `GET /v1/activity` - The caller's latest 50 entries, newest first

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use ledgerline_shared::{auth::session::AuthContext, models::activity_log::ActivityLog};

pub async fn list_activity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let entries = ActivityLog::recent(&state.db, auth.owner()).await?;
    Ok(Json(entries))
}
