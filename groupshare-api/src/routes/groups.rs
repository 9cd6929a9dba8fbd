/// Group and membership endpoints
///
/// - `GET /v1/groups` - groups the caller belongs to
/// - `POST /v1/groups` - create a group (caller becomes owner and first member)
/// - `DELETE /v1/groups/:id` - delete a group (owner only)
/// - `GET /v1/groups/:id/members` - list members (members only)
/// - `POST /v1/groups/:id/members` - invite a registered user by email (owner only)
/// - `DELETE /v1/groups/:id/members/:user_id` - remove a member (owner only, or self)
/// - `POST /v1/groups/:id/leave` - leave a group (any member except the owner)

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use groupshare_shared::{
    auth::middleware::AuthContext,
    models::{
        group::Group,
        membership::{Member, Membership},
    },
    services::membership,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

pub async fn list_groups(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<Group>>> {
    Ok(Json(membership::list_groups(&state.db, auth.user_id).await?))
}

pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    req.validate()?;

    let group = membership::create_group(&state.db, auth.user_id, &req.name, &req.description).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn delete_group(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(group_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    membership::delete_group(&state.db, auth.user_id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Member>>> {
    Ok(Json(membership::list_members(&state.db, auth.user_id, group_id).await?))
}

/// Adds a registered user to the group
///
/// # Errors
///
/// - `403`: caller is not the group owner
/// - `404`: group or user not found
/// - `409`: user is already a member
pub async fn invite_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(group_id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<(StatusCode, Json<Membership>)> {
    req.validate()?;

    let membership = membership::invite(&state.db, auth.user_id, group_id, &req.email).await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    membership::remove_member(&state.db, auth.user_id, group_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave_group(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(group_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    membership::leave(&state.db, auth.user_id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
