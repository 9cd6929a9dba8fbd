//! Shared helpers for API integration tests
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`.
//! Tests that need PostgreSQL call [`TestContext::new`], which returns None
//! when `DATABASE_URL` is unset so they skip instead of failing.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use groupshare_api::app::{build_router, AppState};
use groupshare_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, StorageConfig};
use groupshare_shared::db::migrations::{ensure_database_exists, run_migrations};
use groupshare_shared::db::pool::{create_pool, DatabaseConfig as PoolConfig};
use groupshare_shared::storage::MemoryBlobStore;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-characters";
pub const PASSWORD: &str = "correct-horse-battery";
pub const BOUNDARY: &str = "groupshare-test-boundary";

pub fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        storage: StorageConfig {
            root: std::env::temp_dir().join("groupshare-api-tests"),
            allowed_extensions: vec!["txt".to_string(), "pdf".to_string()],
            max_upload_bytes: 1024,
        },
    }
}

/// Router over a pool that never connects
///
/// Enough for routes that fail before touching the database (auth,
/// validation); the health probe reports `degraded`.
pub fn offline_app() -> Router {
    let url = "postgresql://groupshare@127.0.0.1:1/groupshare_offline";
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy(url)
        .expect("Failed to build lazy pool");

    build_router(AppState::new(pool, test_config(url), Arc::new(MemoryBlobStore::new())))
}

/// Router backed by a real database and an in-memory blob store
pub struct TestContext {
    pub db: PgPool,
    pub blobs: Arc<MemoryBlobStore>,
    pub app: Router,
}

impl TestContext {
    pub async fn new() -> Option<Self> {
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

        let db = create_pool(PoolConfig {
            url: url.clone(),
            max_connections: 5,
            ..Default::default()
        })
        .await
        .expect("Failed to connect to test database");

        run_migrations(&db).await.expect("Failed to run migrations");

        let blobs = Arc::new(MemoryBlobStore::new());
        let app = build_router(AppState::new(db.clone(), test_config(&url), blobs.clone()));

        Some(Self { db, blobs, app })
    }

    /// Registers a fresh user over HTTP and returns `(user_id, email, access_token)`
    pub async fn register(&self, prefix: &str) -> (Uuid, String, String) {
        let tag = Uuid::new_v4().simple().to_string();
        let username = format!("{}_{}", prefix, &tag[..12]);
        let email = format!("{}@example.test", username);

        let (status, body) = send(
            &self.app,
            json_request(
                Method::POST,
                "/v1/auth/register",
                None,
                serde_json::json!({ "username": username, "email": email, "password": PASSWORD }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        let user_id = body["user_id"].as_str().unwrap().parse().unwrap();
        let token = body["access_token"].as_str().unwrap().to_string();
        (user_id, email, token)
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Single-file `multipart/form-data` upload under the `file` field
pub fn upload_request(token: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/v1/files")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Sends a request and parses the body as JSON (Null when empty)
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
