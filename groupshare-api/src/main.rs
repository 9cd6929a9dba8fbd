//! # GroupShare API Server
//!
//! Serves the group file-sharing and task-tracking API.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/groupshare JWT_SECRET=... cargo run -p groupshare-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured logs and `RUST_LOG` to override the
//! default filter.

use anyhow::Context;
use groupshare_api::{
    app::{build_router, AppState},
    config::Config,
};
use groupshare_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    storage::LocalBlobStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "groupshare_api=debug,groupshare_shared=info,tower_http=debug";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("GroupShare API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("failed to connect to database")?;

    run_migrations(&pool).await.context("failed to run migrations")?;

    tokio::fs::create_dir_all(&config.storage.root)
        .await
        .with_context(|| format!("failed to create storage root {}", config.storage.root.display()))?;
    let blobs = Arc::new(LocalBlobStore::new(config.storage.root.clone()));
    tracing::info!(root = %blobs.root().display(), "Local blob store ready");

    let address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, blobs));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}
