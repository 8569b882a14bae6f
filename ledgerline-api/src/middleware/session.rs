/// Session authentication layer
///
/// Resolves the session token (cookie first, then bearer header), and on
/// success inserts an [`AuthContext`] into the request extensions for
/// handlers to pick up with `Extension<AuthContext>`. Requests without a
/// valid session, or whose user has since been deleted, are answered with
/// `401` before reaching the handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use ledgerline_shared::{
    auth::session::{authenticate, AuthContext},
    models::user::User,
};

use crate::{app::AppState, error::ApiError};

pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth: AuthContext = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(path = %req.uri().path(), error = %e, "Rejected unauthenticated request");
        ApiError::from(e)
    })?;

    if !User::exists(&state.db, auth.user_id).await? {
        tracing::debug!(user_id = auth.user_id, "Rejected session of deleted user");
        return Err(ApiError::Unauthorized("User no longer exists".to_string()));
    }

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
