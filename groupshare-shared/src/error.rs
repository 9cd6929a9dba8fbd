/// Core error type shared by every service operation
///
/// Each variant is a distinct, caller-visible outcome. Authorization failures
/// (`Forbidden`) and missing entities (`NotFound`) are never folded into each
/// other so the transport layer can report them separately.
///
/// # Store errors
///
/// Uniqueness and referential integrity are enforced by PostgreSQL
/// constraints. Use [`is_unique_violation`] and [`is_foreign_key_violation`]
/// to translate the resulting `sqlx::Error` into a domain error instead of
/// checking before inserting.

use uuid::Uuid;

use crate::auth::password::PasswordError;
use crate::storage::BlobError;

/// Result alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the identity, membership, catalog and sharing services
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Caller is authenticated but not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness violation (duplicate email or username)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No resolved caller identity, or the credentials did not match
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Target user already holds a membership edge in the group
    #[error("User {user_id} is already a member of group {group_id}")]
    AlreadyMember { group_id: Uuid, user_id: Uuid },

    /// Caller has no membership edge in the group
    #[error("Not a member of group {0}")]
    NotInGroup(Uuid),

    /// No share edge exists between the resource and the group
    #[error("Resource {resource_id} is not shared with group {group_id}")]
    NotShared { resource_id: Uuid, group_id: Uuid },

    /// Blob store and record store disagree after a partial failure
    #[error("Storage inconsistency: {0}")]
    StorageInconsistency(String),

    /// Payload rejected before reaching any store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Blob store failure
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Unexpected database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CoreError {
    /// Short machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::Forbidden(_) => "forbidden",
            CoreError::Conflict(_) => "conflict",
            CoreError::Unauthenticated(_) => "unauthenticated",
            CoreError::AlreadyMember { .. } => "already_member",
            CoreError::NotInGroup(_) => "not_in_group",
            CoreError::NotShared { .. } => "not_shared",
            CoreError::StorageInconsistency(_) => "storage_inconsistency",
            CoreError::InvalidInput(_) => "invalid_input",
            CoreError::Blob(_) => "blob_error",
            CoreError::Password(_) => "password_error",
            CoreError::Database(_) => "database_error",
        }
    }
}

/// Returns true when the error is a PostgreSQL unique violation (SQLSTATE 23505)
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23505")
    )
}

/// Returns true when the error is a PostgreSQL foreign key violation (SQLSTATE 23503)
pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db_error) if db_error.code().as_deref() == Some("23503")
    )
}

/// Name of the violated constraint, if the database reported one
pub fn violated_constraint(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) => db_error.constraint().map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_distinct_for_authz_and_missing() {
        assert_eq!(CoreError::NotFound("File".into()).code(), "not_found");
        assert_eq!(CoreError::Forbidden("nope".into()).code(), "forbidden");
        assert_ne!(
            CoreError::NotFound("x".into()).code(),
            CoreError::Forbidden("x".into()).code()
        );
    }

    #[test]
    fn test_error_display() {
        let err = CoreError::NotFound("Group".to_string());
        assert_eq!(err.to_string(), "Group not found");

        let group_id = Uuid::new_v4();
        let err = CoreError::NotInGroup(group_id);
        assert!(err.to_string().contains(&group_id.to_string()));
    }

    #[test]
    fn test_non_database_errors_are_not_violations() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert!(violated_constraint(&err).is_none());
    }
}
