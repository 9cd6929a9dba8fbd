//! # GroupShare API Server Library
//!
//! HTTP surface over `groupshare-shared`: accounts, groups, files, tasks and
//! the share edges between them.
//!
//! ## Modules
//!
//! - `app`: application state, router and JWT layer
//! - `config`: environment configuration
//! - `error`: error handling and HTTP response mapping
//! - `middleware`: security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
