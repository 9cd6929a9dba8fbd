/// Resource catalog: files and tasks
///
/// Reads, listings and deletes are written once over the [`Resource`] trait.
/// File creation and deletion also touch the blob store:
///
/// - upload writes the blob first, then the record; if the record insert
///   fails the blob is removed again on a best-effort basis
/// - delete removes the blob first and the record only after that succeeded;
///   a blob error stops the delete with the record untouched

use bytes::Bytes;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require, Action, ResourceFacts, Target};
use crate::error::{is_foreign_key_violation, CoreError, CoreResult};
use crate::models::file::{CreateFile, File};
use crate::models::resource::{self, Resource};
use crate::models::share::Share;
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::storage::{BlobError, BlobStore, UploadPolicy};

fn not_found<R: Resource>() -> CoreError {
    CoreError::NotFound(R::KIND.label().to_string())
}

pub(crate) async fn load<R: Resource>(pool: &PgPool, id: Uuid) -> CoreResult<R> {
    resource::find_by_id::<R>(pool, id).await?.ok_or_else(not_found::<R>)
}

/// Gate facts for `actor` looking at `item`
pub(crate) async fn facts_for<R: Resource>(pool: &PgPool, item: &R, actor: Uuid) -> CoreResult<ResourceFacts> {
    let shared_with_actor = if item.owner_id() == actor {
        false
    } else {
        Share::reachable_via_group(pool, R::KIND, item.id(), actor).await?
    };

    Ok(ResourceFacts {
        kind: R::KIND,
        owner_id: item.owner_id(),
        shared_with_actor,
    })
}

fn owner_only<R: Resource>(item: &R) -> Target {
    Target::Resource(ResourceFacts::owned_by(R::KIND, item.owner_id()))
}

fn validate_title(title: &str) -> CoreResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CoreError::InvalidInput("task title is required".to_string()));
    }
    Ok(title.to_string())
}

/// Stores an upload and records it as a file owned by `actor`
///
/// # Errors
///
/// - `Blob` for a rejected name, extension or size, or a store failure
/// - `NotFound` if the actor's account no longer exists
pub async fn upload_file(
    pool: &PgPool,
    blobs: &dyn BlobStore,
    policy: &UploadPolicy,
    actor: Uuid,
    file_name: &str,
    bytes: Bytes,
) -> CoreResult<File> {
    let name = policy.check_name(file_name)?;
    policy.check_size(bytes.len())?;

    let storage_path = policy.blob_path(actor, &name);
    let size = bytes.len();
    blobs.put(&storage_path, bytes).await?;

    let created = File::create(
        pool,
        CreateFile {
            name,
            storage_path: storage_path.clone(),
            owner_id: actor,
        },
    )
    .await;

    match created {
        Ok(file) => {
            info!(file_id = %file.id, owner_id = %actor, size, backend = blobs.name(), "File uploaded");
            Ok(file)
        }
        Err(e) => {
            if let Err(cleanup) = blobs.delete(&storage_path).await {
                warn!(path = %storage_path, error = %cleanup, "Failed to remove orphaned blob");
            }
            if is_foreign_key_violation(&e) {
                Err(CoreError::NotFound("User".to_string()))
            } else {
                Err(CoreError::Database(e))
            }
        }
    }
}

/// Creates a task owned by `actor`
pub async fn create_task(pool: &PgPool, actor: Uuid, title: &str, description: &str) -> CoreResult<Task> {
    let title = validate_title(title)?;

    let task = Task::create(
        pool,
        CreateTask {
            title,
            description: description.to_string(),
            owner_id: actor,
        },
    )
    .await
    .map_err(|e| {
        if is_foreign_key_violation(&e) {
            CoreError::NotFound("User".to_string())
        } else {
            CoreError::Database(e)
        }
    })?;

    info!(task_id = %task.id, owner_id = %actor, "Task created");
    Ok(task)
}

/// Resources owned by `actor`, oldest first
pub async fn list_owned<R: Resource>(pool: &PgPool, actor: Uuid) -> CoreResult<Vec<R>> {
    let items = resource::list_owned::<R>(pool, actor).await?;
    debug!(user_id = %actor, kind = %R::KIND, count = items.len(), "Listed owned resources");
    Ok(items)
}

/// Fetches a single resource the actor is allowed to read
pub async fn get<R: Resource>(pool: &PgPool, actor: Uuid, id: Uuid) -> CoreResult<R> {
    let item = load::<R>(pool, id).await?;
    let facts = facts_for(pool, &item, actor).await?;
    require(actor, Action::Read, &Target::Resource(facts))?;

    Ok(item)
}

/// Reads a file's bytes, gated like [`get`]
pub async fn download(pool: &PgPool, blobs: &dyn BlobStore, actor: Uuid, file_id: Uuid) -> CoreResult<(File, Bytes)> {
    let file = get::<File>(pool, actor, file_id).await?;

    match blobs.get(&file.storage_path).await {
        Ok(bytes) => Ok((file, bytes)),
        Err(BlobError::NotFound(path)) => {
            error!(file_id = %file.id, path = %path, "File record has no blob");
            Err(CoreError::StorageInconsistency(format!(
                "file {} has a record but no stored content",
                file.id
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Overwrites a task's title and description
///
/// # Errors
///
/// - `NotFound` if the task doesn't exist
/// - `Forbidden` unless `actor` owns it, regardless of sharing
pub async fn update_task(pool: &PgPool, actor: Uuid, task_id: Uuid, fields: UpdateTask) -> CoreResult<Task> {
    let task = load::<Task>(pool, task_id).await?;
    require(actor, Action::Write, &owner_only(&task))?;

    let fields = UpdateTask {
        title: validate_title(&fields.title)?,
        description: fields.description,
    };

    let updated = Task::update(pool, task.id, fields)
        .await?
        .ok_or_else(not_found::<Task>)?;

    info!(task_id = %task.id, owner_id = %actor, "Task updated");
    Ok(updated)
}

/// Deletes a task and its share edges
pub async fn delete_task(pool: &PgPool, actor: Uuid, task_id: Uuid) -> CoreResult<()> {
    let task = load::<Task>(pool, task_id).await?;
    require(actor, Action::Delete, &owner_only(&task))?;

    if !resource::delete_record(pool, Task::KIND, task.id).await? {
        return Err(not_found::<Task>());
    }

    info!(task_id = %task.id, owner_id = %actor, "Task deleted");
    Ok(())
}

/// Deletes a file's blob, then its record
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `Forbidden` unless `actor` owns it
/// - `Blob` if the blob delete failed; the record is left in place
/// - `StorageInconsistency` if the blob is gone but the record delete failed
pub async fn delete_file(pool: &PgPool, blobs: &dyn BlobStore, actor: Uuid, file_id: Uuid) -> CoreResult<()> {
    let file = load::<File>(pool, file_id).await?;
    require(actor, Action::Delete, &owner_only(&file))?;

    let existed = blobs.delete(&file.storage_path).await.map_err(|e| {
        error!(file_id = %file.id, path = %file.storage_path, error = %e, "Blob delete failed; record kept");
        CoreError::Blob(e)
    })?;

    if !existed {
        warn!(file_id = %file.id, path = %file.storage_path, "Blob was already missing");
    }

    match resource::delete_record(pool, File::KIND, file.id).await {
        Ok(true) => {
            info!(file_id = %file.id, owner_id = %actor, "File deleted");
            Ok(())
        }
        Ok(false) => Err(not_found::<File>()),
        Err(e) => {
            error!(file_id = %file.id, error = %e, "Blob deleted but record delete failed");
            Err(CoreError::StorageInconsistency(format!(
                "content of file {} was removed but its record could not be deleted: {}",
                file.id, e
            )))
        }
    }
}
