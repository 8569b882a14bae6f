/// Localization settings
///
/// - `GET /v1/settings` - Current settings, created with defaults on first read
/// - `PUT /v1/settings` - Replace all settings

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{extract::State, Extension, Json};
use ledgerline_shared::{
    auth::session::AuthContext,
    models::settings::{Settings, UpdateSettings},
};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    /// ISO 3166 alpha-2
    #[validate(length(equal = 2, message = "Country must be a 2-letter code"))]
    pub country: String,

    /// ISO 4217
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    #[validate(length(min = 1, max = 8, message = "Currency symbol must be 1 to 8 characters"))]
    pub currency_symbol: String,

    #[validate(range(min = 0, max = 4, message = "Decimals must be between 0 and 4"))]
    pub decimals: i64,
}

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Settings>> {
    let settings = Settings::get_or_create(&state.db, auth.owner()).await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<UpdateSettingsRequest>,
) -> ApiResult<Json<Settings>> {
    let settings = Settings::upsert(
        &state.db,
        auth.owner(),
        UpdateSettings {
            country: req.country,
            currency: req.currency,
            currency_symbol: req.currency_symbol,
            decimals: req.decimals,
        },
    )
    .await?;

    Ok(Json(settings))
}
