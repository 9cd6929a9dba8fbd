/// Share edge endpoints for files and tasks
///
/// - `GET /v1/{files,tasks}/:id/shares` - groups the resource is shared with (owner only)
/// - `PUT /v1/{files,tasks}/:id/shares/:group_id` - share with a group
/// - `DELETE /v1/{files,tasks}/:id/shares/:group_id` - stop sharing
///
/// `PUT` is idempotent: `201` when the edge was created, `200` when it
/// already existed.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use groupshare_shared::{
    auth::middleware::AuthContext,
    models::{resource::ResourceKind, share::SharedGroup},
    services::sharing,
};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub kind: ResourceKind,
    pub resource_id: Uuid,
    pub group_id: Uuid,

    /// False when the edge already existed
    pub created: bool,
}

async fn list(state: &AppState, auth: AuthContext, kind: ResourceKind, id: Uuid) -> ApiResult<Json<Vec<SharedGroup>>> {
    Ok(Json(sharing::list_shares(&state.db, auth.user_id, kind, id).await?))
}

async fn share(
    state: &AppState,
    auth: AuthContext,
    kind: ResourceKind,
    resource_id: Uuid,
    group_id: Uuid,
) -> ApiResult<(StatusCode, Json<ShareResponse>)> {
    let created = sharing::share(&state.db, auth.user_id, kind, resource_id, group_id).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };

    Ok((
        status,
        Json(ShareResponse {
            kind,
            resource_id,
            group_id,
            created,
        }),
    ))
}

async fn unshare(
    state: &AppState,
    auth: AuthContext,
    kind: ResourceKind,
    resource_id: Uuid,
    group_id: Uuid,
) -> ApiResult<StatusCode> {
    sharing::unshare(&state.db, auth.user_id, kind, resource_id, group_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_file_shares(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SharedGroup>>> {
    list(&state, auth, ResourceKind::File, file_id).await
}

pub async fn share_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((file_id, group_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<ShareResponse>)> {
    share(&state, auth, ResourceKind::File, file_id, group_id).await
}

pub async fn unshare_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((file_id, group_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    unshare(&state, auth, ResourceKind::File, file_id, group_id).await
}

pub async fn list_task_shares(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Vec<SharedGroup>>> {
    list(&state, auth, ResourceKind::Task, task_id).await
}

pub async fn share_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((task_id, group_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<ShareResponse>)> {
    share(&state, auth, ResourceKind::Task, task_id, group_id).await
}

pub async fn unshare_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path((task_id, group_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    unshare(&state, auth, ResourceKind::Task, task_id, group_id).await
}
