/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: access/refresh token issuing and validation
/// - [`middleware`]: Axum authentication boundary and `AuthContext`
/// - [`authorization`]: the access gate
///
/// # Example
///
/// ```no_run
/// use groupshare_shared::auth::password::{hash_password, verify_password};
/// use groupshare_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), "a-signing-secret-of-at-least-32-bytes")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
