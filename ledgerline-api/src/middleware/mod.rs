/// Middleware modules for the API server
///
/// - `security`: Security response headers
/// - `session`: Resolves the session cookie into an `AuthContext`

pub mod security;
pub mod session;
