/// Category endpoints
///
/// - `GET /v1/categories` - Own and shared categories with this month's spending
/// - `POST /v1/categories` - Create
/// - `PUT /v1/categories/:id` - Change budget limit and color
/// - `DELETE /v1/categories/:id` - Delete; transactions become uncategorized
///
/// Shared default categories can be referenced but never modified.

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
    budget::BudgetSummary,
    models::{
        category::{Category, CreateCategory, UpdateCategoryBudget},
        transaction::TransactionType,
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    pub category_type: TransactionType,

    #[validate(range(min = 0.0, message = "Budget limit cannot be negative"))]
    pub budget_limit: Option<f64>,

    #[validate(length(min = 1, max = 32, message = "Invalid color"))]
    pub color: Option<String>,

    #[validate(length(min = 1, max = 64, message = "Invalid icon"))]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(range(min = 0.0, message = "Budget limit cannot be negative"))]
    pub budget_limit: f64,

    #[validate(length(min = 1, max = 32, message = "Invalid color"))]
    pub color: Option<String>,
}

/// A category with its evaluated budget
#[derive(Debug, Serialize)]
pub struct CategoryView {
    #[serde(flatten)]
    pub category: Category,

    pub budget: BudgetSummary,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        let budget = category.budget();
        Self { category, budget }
    }
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<CategoryView>>> {
    let categories = Category::list(&state.db, auth.owner(), state.today()).await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

pub async fn create_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryView>)> {
    let category = Category::create(
        &state.db,
        auth.owner(),
        CreateCategory {
            name: req.name,
            category_type: req.category_type,
            budget_limit: req.budget_limit,
            color: req.color,
            icon: req.icon,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// # Errors
///
/// - `404 Not Found`: Missing, foreign or shared category
pub async fn update_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryView>> {
    let category = Category::update_budget(
        &state.db,
        auth.owner(),
        id,
        UpdateCategoryBudget {
            budget_limit: req.budget_limit,
            color: req.color,
        },
        state.today(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(category.into()))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = Category::delete(&state.db, auth.owner(), id).await?;
    Ok(Json(DeleteResponse::new(deleted)))
}
