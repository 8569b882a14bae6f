/// Savings goal endpoints
///
/// - `GET /v1/goals` - List by target date, open-ended goals last
/// - `POST /v1/goals` - Create
/// - `POST /v1/goals/:id/contribute` - Add money to a goal
/// - `DELETE /v1/goals/:id` - Delete

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
use chrono::NaiveDate;
use ledgerline_shared::{
    auth::session::AuthContext,
    models::savings_goal::{CreateSavingsGoal, SavingsGoal},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[validate(range(exclusive_min = 0.0, message = "Target amount must be positive"))]
    pub target_amount: f64,

    #[validate(range(min = 0.0, message = "Current amount cannot be negative"))]
    pub current_amount: Option<f64>,

    pub target_date: Option<NaiveDate>,

    #[validate(length(min = 1, max = 32, message = "Invalid color"))]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContributeRequest {
    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: f64,
}

/// A goal with its progress
#[derive(Debug, Serialize)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: SavingsGoal,

    /// Percent of the target reached, capped at 100
    pub progress_percent: f64,
}

impl From<SavingsGoal> for GoalView {
    fn from(goal: SavingsGoal) -> Self {
        let progress_percent = goal.progress_percent();
        Self { goal, progress_percent }
    }
}

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<GoalView>>> {
    let goals = SavingsGoal::list(&state.db, auth.owner()).await?;
    Ok(Json(goals.into_iter().map(GoalView::from).collect()))
}

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<GoalView>)> {
    let goal = SavingsGoal::create(
        &state.db,
        auth.owner(),
        CreateSavingsGoal {
            name: req.name,
            target_amount: req.target_amount,
            current_amount: req.current_amount,
            target_date: req.target_date,
            color: req.color,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(goal.into())))
}

/// Adds to the goal's current amount
///
/// # Errors
///
/// - `400 Bad Request`: Amount is not positive
/// - `404 Not Found`: No such goal for the caller
pub async fn contribute(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<ContributeRequest>,
) -> ApiResult<Json<GoalView>> {
    let goal = SavingsGoal::contribute(&state.db, auth.owner(), id, req.amount)
        .await?
        .ok_or_else(|| ApiError::NotFound("Goal not found".to_string()))?;

    tracing::debug!(user_id = auth.user_id, goal_id = id, amount = req.amount, "Goal contribution");

    Ok(Json(goal.into()))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = SavingsGoal::delete(&state.db, auth.owner(), id).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
