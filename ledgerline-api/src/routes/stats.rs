/// Dashboard statistics
///
/// - `GET /v1/stats/overview` - Net worth, this month's totals, bills due this week
/// - `GET /v1/stats/charts` - Twelve-month trend and spending by category

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use ledgerline_shared::{
    auth::session::AuthContext,
    stats::{self, Charts, Overview},
};

pub async fn overview(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Overview>> {
    let overview = stats::overview(&state.db, auth.owner(), state.today()).await?;
    Ok(Json(overview))
}

pub async fn charts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Charts>> {
    let charts = stats::charts(&state.db, auth.owner(), state.today()).await?;
    Ok(Json(charts))
}
