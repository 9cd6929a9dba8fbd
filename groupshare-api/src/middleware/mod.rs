/// Middleware for the API server
///
/// JWT authentication lives in [`crate::app`] because it needs `AppState`;
/// this module holds the state-free layers.

pub mod security;
