//! # GroupShare Shared Library
//!
//! Core of the GroupShare file-sharing and task-tracking service: the data
//! model, the access gate, blob storage, and the services that apply the
//! sharing rules. The HTTP server in `groupshare-api` is a thin layer over
//! [`services`].
//!
//! ## Module Organization
//!
//! - `auth`: passwords, JWTs, the request authentication boundary, access gate
//! - `db`: connection pool and embedded migrations
//! - `error`: `CoreError` and store error translation
//! - `models`: per-table SQL
//! - `services`: identity, membership, catalog and sharing operations
//! - `storage`: blob stores and upload validation

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

/// Current version of the GroupShare shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
