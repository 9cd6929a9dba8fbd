/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use groupshare_api::{app::AppState, config::Config};
/// use groupshare_shared::storage::LocalBlobStore;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let blobs = Arc::new(LocalBlobStore::new(config.storage.root.clone()));
/// let app = groupshare_api::app::build_router(AppState::new(pool, config, blobs));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use groupshare_shared::{
    auth::middleware::authenticate,
    storage::{BlobStore, UploadPolicy},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared application state, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub blobs: Arc<dyn BlobStore>,
    pub upload_policy: Arc<UploadPolicy>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, blobs: Arc<dyn BlobStore>) -> Self {
        let upload_policy = Arc::new(config.storage.upload_policy());

        Self {
            db,
            config: Arc::new(config),
            blobs,
            upload_policy,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /health
/// └── /v1
///     ├── /auth            register, login, refresh (public); password, me
///     ├── /groups          list, create, delete, members, invite, leave
///     ├── /files           owned, visible, upload, read, content, delete, shares
///     └── /tasks           owned, visible, create, read, update, delete, shares
/// ```
///
/// Everything under `/v1` except the public auth routes passes through
/// [`jwt_auth_layer`].
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let group_routes = Router::new()
        .route("/", get(routes::groups::list_groups).post(routes::groups::create_group))
        .route("/:id", axum::routing::delete(routes::groups::delete_group))
        .route(
            "/:id/members",
            get(routes::groups::list_members).post(routes::groups::invite_member),
        )
        .route(
            "/:id/members/:user_id",
            axum::routing::delete(routes::groups::remove_member),
        )
        .route("/:id/leave", post(routes::groups::leave_group));

    let upload_limit = state.upload_policy.max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    let file_routes = Router::new()
        .route(
            "/",
            get(routes::files::list_owned)
                .post(routes::files::upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/visible", get(routes::files::list_visible))
        .route("/:id", get(routes::files::get_file).delete(routes::files::delete_file))
        .route("/:id/content", get(routes::files::download))
        .route("/:id/shares", get(routes::shares::list_file_shares))
        .route(
            "/:id/shares/:group_id",
            put(routes::shares::share_file).delete(routes::shares::unshare_file),
        );

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_owned).post(routes::tasks::create_task))
        .route("/visible", get(routes::tasks::list_visible))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/shares", get(routes::shares::list_task_shares))
        .route(
            "/:id/shares/:group_id",
            put(routes::shares::share_task).delete(routes::shares::unshare_task),
        );

    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/password", post(routes::auth::change_password))
        .nest("/groups", group_routes)
        .nest("/files", file_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes)
        .merge(protected_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Resolves the caller identity and inserts `AuthContext` into extensions
async fn jwt_auth_layer(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
