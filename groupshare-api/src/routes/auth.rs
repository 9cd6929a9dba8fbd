/// Authentication endpoints
///
/// - `POST /v1/auth/register` - create an account and receive tokens
/// - `POST /v1/auth/login` - exchange credentials (email or username) for tokens
/// - `POST /v1/auth/refresh` - exchange a refresh token for an access token
/// - `GET /v1/auth/me` - the authenticated user's profile
/// - `POST /v1/auth/password` - change the authenticated user's password

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use groupshare_shared::{
    auth::{jwt, middleware::AuthContext},
    models::user::User,
    services::identity,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email or username
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,

    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub new_password: String,
}

/// Tokens returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    fn issue(user: &User, secret: &str) -> ApiResult<Self> {
        let pair = jwt::issue_token_pair(user.id, secret)?;

        Ok(Self {
            user_id: user.id,
            username: user.username.clone(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Registers a new user
///
/// # Errors
///
/// - `422`: validation failed
/// - `409`: email or username already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let user = identity::register(&state.db, &req.username, &req.email, &req.password).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse::issue(&user, state.jwt_secret())?)))
}

/// Logs in with email or username
///
/// # Errors
///
/// - `401`: unknown identifier or wrong password (indistinguishable)
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = identity::authenticate(&state.db, &req.identifier, &req.password).await?;

    Ok(Json(AuthResponse::issue(&user, state.jwt_secret())?))
}

/// Exchanges a refresh token for a new access token
///
/// The account must still exist.
pub async fn refresh(State(state): State<AppState>, Json(req): Json<RefreshRequest>) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;
    identity::current_user(&state.db, claims.sub).await?;

    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    Ok(Json(identity::current_user(&state.db, auth.user_id).await?))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    identity::change_password(&state.db, auth.user_id, &req.current_password, &req.new_password).await?;

    Ok(StatusCode::NO_CONTENT)
}
