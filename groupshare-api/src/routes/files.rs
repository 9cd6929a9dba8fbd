/// File endpoints
///
/// Uploads arrive as `multipart/form-data` with the content in a field named
/// `file`. The file name is sanitized and checked against the upload policy
/// before anything is stored.
///
/// ```text
/// POST /v1/files              upload
/// GET  /v1/files              files the caller owns
/// GET  /v1/files/visible      owned plus shared with any of the caller's groups
/// GET  /v1/files/:id          metadata
/// GET  /v1/files/:id/content  download
/// DELETE /v1/files/:id        delete content and record (owner only)
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use groupshare_shared::{
    auth::middleware::AuthContext,
    models::file::File,
    services::{catalog, sharing},
};
use tracing::debug;
use uuid::Uuid;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

/// Uploads a file
///
/// # Errors
///
/// - `400`: no `file` field, or a malformed multipart body
/// - `413`: content exceeds the configured maximum
/// - `422`: empty name or extension not allowed
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<File>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        debug!(user_id = %auth.user_id, file_name = %file_name, size = bytes.len(), "Upload received");

        let file = catalog::upload_file(
            &state.db,
            state.blobs.as_ref(),
            &state.upload_policy,
            auth.user_id,
            &file_name,
            bytes,
        )
        .await?;

        return Ok((StatusCode::CREATED, Json(file)));
    }

    Err(ApiError::BadRequest(format!("missing multipart field '{}'", FILE_FIELD)))
}

pub async fn list_owned(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<File>>> {
    Ok(Json(catalog::list_owned::<File>(&state.db, auth.user_id).await?))
}

pub async fn list_visible(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<File>>> {
    Ok(Json(sharing::visible_to::<File>(&state.db, auth.user_id).await?))
}

pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(file_id): Path<Uuid>,
) -> ApiResult<Json<File>> {
    Ok(Json(catalog::get::<File>(&state.db, auth.user_id, file_id).await?))
}

/// Streams a file's content as an attachment
pub async fn download(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(file_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let (file, bytes) = catalog::download(&state.db, state.blobs.as_ref(), auth.user_id, file_id).await?;

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&file.name).to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file.name)),
    ];

    Ok((headers, bytes))
}

pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(file_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    catalog::delete_file(&state.db, state.blobs.as_ref(), auth.user_id, file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Content type guessed from the (already sanitized) file name
fn content_type_for(name: &str) -> &'static str {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "txt" => "text/plain; charset=utf-8",
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("notes.txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("archive"), "application/octet-stream");
    }
}
