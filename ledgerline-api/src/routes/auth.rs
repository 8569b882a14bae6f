/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Create a user with a starter account and categories
/// - `POST /v1/auth/login` - Verify credentials and set the session cookie
/// - `POST /v1/auth/logout` - Clear the session cookie
/// - `GET /v1/auth/me` - Current user's profile
///
/// Sessions live in the HTTP-only `auth_token` cookie. The login response
/// also carries the token for clients that prefer a bearer header.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::CookieJar;
use ledgerline_shared::{
    auth::{
        jwt::{self, Claims},
        password,
        session::{self, AuthContext},
    },
    models::{
        activity_log::{Action, ActivityLog},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: User,

    /// Same token as the cookie, valid for 7 days
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    if req.name.trim().chars().count() < 2 {
        return Err(ApiError::BadRequest("Name must be at least 2 characters".to_string()));
    }

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
        },
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        // Lost a race with a concurrent registration
        ApiError::Conflict(_) => ApiError::Conflict("User already exists".to_string()),
        other => other,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// Verify credentials and start a session
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;

    let claims = Claims::new(user.id, user.email.clone(), user.name.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    ActivityLog::record(&state.db, user.owner(), Action::Login, "User logged in").await;
    tracing::info!(user_id = user.id, "User logged in");

    let jar = jar.add(session::session_cookie(token.clone(), state.config.secure_cookies()));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
            token,
        }),
    ))
}

/// End the session
///
/// Always succeeds. The logout is recorded only when the request carried a
/// valid session.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    if let Some(cookie) = jar.get(session::AUTH_COOKIE) {
        if let Ok(claims) = jwt::validate_token(cookie.value(), state.jwt_secret()) {
            let auth = AuthContext::from_claims(claims);
            ActivityLog::record(&state.db, auth.owner(), Action::Logout, "User logged out").await;
        }
    }

    let jar = jar.add(session::expired_session_cookie(state.config.secure_cookies()));

    (
        jar,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user))
}
