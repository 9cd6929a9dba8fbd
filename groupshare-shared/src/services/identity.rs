/// Identity store: registration and credential checks
///
/// Email and username uniqueness is enforced by the `users` constraints; a
/// losing concurrent registration observes `Conflict` instead of creating a
/// second row.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password, verify_password, PasswordError};
use crate::error::{is_unique_violation, violated_constraint, CoreError, CoreResult};
use crate::models::user::{CreateUser, User};

fn check_password(password: &str) -> CoreResult<()> {
    validate_password(password).map_err(|e| match e {
        PasswordError::InvalidLength { .. } => CoreError::InvalidInput(e.to_string()),
        other => CoreError::Password(other),
    })
}

/// Creates a user account
///
/// # Errors
///
/// - `Conflict` if the email or username is already registered
/// - `InvalidInput` for an empty username/email or a password outside the
///   length bounds
pub async fn register(pool: &PgPool, username: &str, email: &str, password: &str) -> CoreResult<User> {
    let username = username.trim();
    let email = email.trim();

    if username.is_empty() || email.is_empty() {
        return Err(CoreError::InvalidInput("username and email are required".to_string()));
    }
    check_password(password)?;

    let password_hash = hash_password(password)?;

    let user = User::create(
        pool,
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            let message = match violated_constraint(&e).as_deref() {
                Some("users_email_key") => "email is already registered",
                _ => "username is already taken",
            };
            warn!(username, "Registration rejected: {}", message);
            CoreError::Conflict(message.to_string())
        } else {
            CoreError::Database(e)
        }
    })?;

    info!(user_id = %user.id, username = %user.username, "User registered");
    Ok(user)
}

/// Verifies credentials, where `identifier` is an email or a username
///
/// Unknown identifiers and wrong passwords produce the same error.
pub async fn authenticate(pool: &PgPool, identifier: &str, password: &str) -> CoreResult<User> {
    let invalid = || CoreError::Unauthenticated("invalid credentials".to_string());

    let user = User::find_by_identifier(pool, identifier.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Failed login attempt");
        return Err(invalid());
    }

    info!(user_id = %user.id, "User authenticated");
    Ok(user)
}

/// Resolves a user that a token claims to identify
pub async fn current_user(pool: &PgPool, actor: Uuid) -> CoreResult<User> {
    User::find_by_id(pool, actor)
        .await?
        .ok_or_else(|| CoreError::Unauthenticated("account no longer exists".to_string()))
}

/// Replaces the actor's password after re-checking the current one
pub async fn change_password(
    pool: &PgPool,
    actor: Uuid,
    current_password: &str,
    new_password: &str,
) -> CoreResult<()> {
    let user = current_user(pool, actor).await?;

    if !verify_password(current_password, &user.password_hash)? {
        return Err(CoreError::Unauthenticated("current password is incorrect".to_string()));
    }
    check_password(new_password)?;

    let password_hash = hash_password(new_password)?;
    User::update_password(pool, actor, &password_hash)
        .await?
        .ok_or_else(|| CoreError::NotFound("User".to_string()))?;

    info!(user_id = %actor, "Password changed");
    Ok(())
}
