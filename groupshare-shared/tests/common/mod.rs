//! Shared helpers for database-backed integration tests
//!
//! Tests connect to `DATABASE_URL` and skip (returning early) when it is
//! unset, so `cargo test` passes on machines without PostgreSQL.

#![allow(dead_code)]

use groupshare_shared::db::migrations::{ensure_database_exists, run_migrations};
use groupshare_shared::db::pool::{create_pool, DatabaseConfig};
use groupshare_shared::models::user::User;
use groupshare_shared::services::identity;
use sqlx::PgPool;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// Connects and migrates, or returns None when no database is configured
pub async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        }
    };

    ensure_database_exists(&url)
        .await
        .expect("Failed to create test database");

    let pool = create_pool(DatabaseConfig {
        url,
        max_connections: 5,
        ..Default::default()
    })
    .await
    .expect("Failed to connect to test database");

    run_migrations(&pool).await.expect("Failed to run migrations");
    Some(pool)
}

/// Registers a user with a unique username and email
pub async fn register_user(pool: &PgPool, prefix: &str) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    let username = format!("{}_{}", prefix, &tag[..12]);
    let email = format!("{}@example.test", username);

    identity::register(pool, &username, &email, PASSWORD)
        .await
        .expect("Failed to register user")
}
