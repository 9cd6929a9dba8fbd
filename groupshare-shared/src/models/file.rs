/// File model and database operations
///
/// A file record points at a blob via `storage_path`. The path is unique, so
/// two records can never reference the same blob.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE files (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     storage_path VARCHAR(512) NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     uploaded_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),
///     CONSTRAINT files_storage_path_key UNIQUE (storage_path)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::resource::{Resource, ResourceKind};

/// Uploaded file metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct File {
    pub id: Uuid,

    /// Sanitized display name
    pub name: String,

    /// Blob store key, namespaced by owner id
    #[serde(skip_serializing)]
    pub storage_path: String,

    pub owner_id: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

/// Input for recording an uploaded file
#[derive(Debug, Clone)]
pub struct CreateFile {
    pub name: String,
    pub storage_path: String,
    pub owner_id: Uuid,
}

impl Resource for File {
    const KIND: ResourceKind = ResourceKind::File;
    const COLUMNS: &'static str = "id, name, storage_path, owner_id, uploaded_at";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl File {
    /// Inserts a file record after its blob has been written
    pub async fn create(pool: &PgPool, data: CreateFile) -> Result<Self, sqlx::Error> {
        let file = sqlx::query_as::<_, File>(
            r#"
            INSERT INTO files (name, storage_path, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, storage_path, owner_id, uploaded_at
            "#,
        )
        .bind(data.name)
        .bind(data.storage_path)
        .bind(data.owner_id)
        .fetch_one(pool)
        .await?;

        Ok(file)
    }
}
