/// Task endpoints
///
/// Tasks are owned by their creator. Group members read tasks shared with
/// their groups; only the owner updates, deletes or shares them.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use groupshare_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, UpdateTask},
    services::{catalog, sharing},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

/// Full replacement of a task's fields
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[serde(default)]
    pub description: String,
}

impl From<UpdateTaskRequest> for UpdateTask {
    fn from(req: UpdateTaskRequest) -> Self {
        UpdateTask {
            title: req.title,
            description: req.description,
        }
    }
}

pub async fn list_owned(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(catalog::list_owned::<Task>(&state.db, auth.user_id).await?))
}

/// Tasks the caller owns plus tasks shared with any of their groups
pub async fn list_visible(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(sharing::visible_to::<Task>(&state.db, auth.user_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = catalog::create_task(&state.db, auth.user_id, &req.title, &req.description).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(catalog::get::<Task>(&state.db, auth.user_id, task_id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate()?;

    let task = catalog::update_task(&state.db, auth.user_id, task_id, req.into()).await?;

    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    catalog::delete_task(&state.db, auth.user_id, task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
