/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation
/// - [`session`]: Session cookie handling and caller resolution
/// - [`authorization`]: The [`authorization::Owner`] scope and reference checks
///
/// # Example
///
/// ```no_run
/// use ledgerline_shared::auth::password::{hash_password, verify_password};
/// use ledgerline_shared::auth::jwt::{create_token, Claims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new(1, "ada@example.com", "Ada");
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod password;
pub mod session;
