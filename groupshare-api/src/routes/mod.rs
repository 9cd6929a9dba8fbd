/// API route handlers
///
/// - `health`: liveness and database probe
/// - `auth`: registration, login, token refresh, account
/// - `groups`: groups and membership
/// - `files`: uploads, downloads and file records
/// - `tasks`: task records
/// - `shares`: share edges for files and tasks

pub mod auth;
pub mod files;
pub mod groups;
pub mod health;
pub mod shares;
pub mod tasks;
