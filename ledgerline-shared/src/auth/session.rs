/// Session resolution and cookie handling
///
/// A session is a signed token (see [`super::jwt`]) stored in the
/// `auth_token` cookie. Browser clients send the cookie automatically; other
/// clients may send the same token as `Authorization: Bearer <token>`.
///
/// After successful authentication the API inserts an [`AuthContext`] into
/// the request extensions, and handlers pull it out with `Extension`.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use ledgerline_shared::auth::jwt::{create_token, Claims};
/// use ledgerline_shared::auth::session::{authenticate, AUTH_COOKIE};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes";
/// let token = create_token(&Claims::new(1, "ada@example.com", "Ada"), secret)?;
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::COOKIE,
///     HeaderValue::from_str(&format!("{}={}", AUTH_COOKIE, token))?,
/// );
///
/// let auth = authenticate(&headers, secret)?;
/// assert_eq!(auth.user_id, 1);
/// # Ok(())
/// # }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use super::authorization::Owner;
use super::jwt::{validate_token, Claims, JwtError};

/// Name of the session cookie
pub const AUTH_COOKIE: &str = "auth_token";

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Email carried in the session token
    pub email: String,

    /// Display name carried in the session token
    pub name: String,
}

impl AuthContext {
    /// Creates auth context from validated claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }

    /// Ownership scope for every query made on behalf of this caller
    pub fn owner(&self) -> Owner {
        Owner::new(self.user_id)
    }
}

/// Error type for session resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Neither a session cookie nor a bearer token was sent
    #[error("Not authenticated")]
    MissingCredentials,

    /// Token was present but is invalid or expired
    #[error("{0}")]
    InvalidToken(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Session expired".to_string()),
            JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
            _ => AuthError::InvalidToken("Invalid session token".to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Pulls the raw session token out of the request headers
///
/// The cookie wins over the `Authorization` header when both are present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolves the caller from request headers
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` when no token was sent and
/// `AuthError::InvalidToken` when the token fails validation.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let token = token_from_headers(headers).ok_or(AuthError::MissingCredentials)?;
    let claims = validate_token(&token, secret)?;

    Ok(AuthContext::from_claims(claims))
}

/// Builds the session cookie for a freshly issued token
///
/// The cookie lives as long as the token does.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    let max_age = time::Duration::seconds(Claims::default_expiration().num_seconds());

    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// Builds a cookie that overwrites and expires the session cookie
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_from_cookie() {
        let token = create_token(&Claims::new(9, "a@b.c", "A"), SECRET).unwrap();
        let headers = cookie_headers(&format!("theme=dark; {}={}", AUTH_COOKIE, token));

        let auth = authenticate(&headers, SECRET).unwrap();
        assert_eq!(auth.user_id, 9);
        assert_eq!(auth.owner(), Owner::new(9));
    }

    #[test]
    fn test_authenticate_from_bearer_header() {
        let token = create_token(&Claims::new(3, "a@b.c", "A"), SECRET).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        assert_eq!(authenticate(&headers, SECRET).unwrap().user_id, 3);
    }

    #[test]
    fn test_missing_and_invalid_credentials() {
        assert!(matches!(
            authenticate(&HeaderMap::new(), SECRET),
            Err(AuthError::MissingCredentials)
        ));

        let headers = cookie_headers(&format!("{}=garbage", AUTH_COOKIE));
        assert!(matches!(
            authenticate(&headers, SECRET),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_empty_cookie_counts_as_missing() {
        let headers = cookie_headers(&format!("{}=", AUTH_COOKIE));
        assert!(matches!(
            authenticate(&headers, SECRET),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), true);

        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(time::Duration::days(7)));
    }

    #[test]
    fn test_auth_error_into_response() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
