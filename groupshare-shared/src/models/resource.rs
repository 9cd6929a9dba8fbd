/// Shared shape of singly-owned resources (files and tasks)
///
/// Files and tasks differ only in their payload columns. Everything the
/// catalog and sharing engine need (lookup, ownership, listing, visibility)
/// is written once here and dispatched through [`ResourceKind`], which maps a
/// kind to its record table and its share-edge table.
///
/// Table and column names interpolated into SQL come exclusively from the
/// `&'static str` constants on [`ResourceKind`] and [`Resource`]; user input
/// is always bound as a parameter.

use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgExecutor, PgPool};
use std::fmt;
use uuid::Uuid;

/// Tag distinguishing the two resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Task,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::File => "file",
            ResourceKind::Task => "task",
        }
    }

    /// Capitalized name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::File => "File",
            ResourceKind::Task => "Task",
        }
    }

    pub(crate) fn table(&self) -> &'static str {
        match self {
            ResourceKind::File => "files",
            ResourceKind::Task => "tasks",
        }
    }

    pub(crate) fn share_table(&self) -> &'static str {
        match self {
            ResourceKind::File => "file_shares",
            ResourceKind::Task => "task_shares",
        }
    }

    /// Column in the share table referencing the resource
    pub(crate) fn share_column(&self) -> &'static str {
        match self {
            ResourceKind::File => "file_id",
            ResourceKind::Task => "task_id",
        }
    }

    /// Monotonic insert timestamp used for creation ordering
    pub(crate) fn created_column(&self) -> &'static str {
        match self {
            ResourceKind::File => "uploaded_at",
            ResourceKind::Task => "created_at",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row type stored in one of the resource tables
pub trait Resource: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Which table family this row belongs to
    const KIND: ResourceKind;

    /// Comma-separated column list matching the struct fields
    const COLUMNS: &'static str;

    fn id(&self) -> Uuid;

    fn owner_id(&self) -> Uuid;
}

/// Finds a resource by ID
pub async fn find_by_id<R: Resource>(pool: &PgPool, id: Uuid) -> Result<Option<R>, sqlx::Error> {
    let kind = R::KIND;
    let sql = format!(
        "SELECT {} FROM {} WHERE id = $1",
        R::COLUMNS,
        kind.table()
    );

    sqlx::query_as::<_, R>(&sql).bind(id).fetch_optional(pool).await
}

/// Lists resources owned by `owner_id`, oldest first
pub async fn list_owned<R: Resource>(pool: &PgPool, owner_id: Uuid) -> Result<Vec<R>, sqlx::Error> {
    let kind = R::KIND;
    let sql = format!(
        "SELECT {cols} FROM {table} WHERE owner_id = $1 ORDER BY {created} ASC, id ASC",
        cols = R::COLUMNS,
        table = kind.table(),
        created = kind.created_column(),
    );

    sqlx::query_as::<_, R>(&sql).bind(owner_id).fetch_all(pool).await
}

/// Lists resources the user owns or can read through a group share
///
/// Each resource appears once no matter how many of the user's groups it is
/// shared with.
pub async fn list_visible_to<R: Resource>(pool: &PgPool, user_id: Uuid) -> Result<Vec<R>, sqlx::Error> {
    let kind = R::KIND;
    let sql = format!(
        r#"
        SELECT {cols} FROM {table}
        WHERE {table}.owner_id = $1
           OR EXISTS (
                SELECT 1
                FROM {shares} s
                JOIN memberships m ON m.group_id = s.group_id
                WHERE s.{share_col} = {table}.id AND m.user_id = $1
           )
        ORDER BY {table}.{created} ASC, {table}.id ASC
        "#,
        cols = R::COLUMNS,
        table = kind.table(),
        shares = kind.share_table(),
        share_col = kind.share_column(),
        created = kind.created_column(),
    );

    sqlx::query_as::<_, R>(&sql).bind(user_id).fetch_all(pool).await
}

/// Returns the owner of a resource, or None if it doesn't exist
pub async fn owner_of(pool: &PgPool, kind: ResourceKind, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
    let sql = format!("SELECT owner_id FROM {} WHERE id = $1", kind.table());

    sqlx::query_scalar::<_, Uuid>(&sql).bind(id).fetch_optional(pool).await
}

/// Deletes a resource record; share edges cascade
///
/// Returns true if a row was deleted.
pub async fn delete_record<'e, E>(executor: E, kind: ResourceKind, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tables() {
        assert_eq!(ResourceKind::File.table(), "files");
        assert_eq!(ResourceKind::File.share_table(), "file_shares");
        assert_eq!(ResourceKind::File.share_column(), "file_id");
        assert_eq!(ResourceKind::Task.table(), "tasks");
        assert_eq!(ResourceKind::Task.share_table(), "task_shares");
        assert_eq!(ResourceKind::Task.share_column(), "task_id");
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&ResourceKind::File).unwrap(), "\"file\"");
        let kind: ResourceKind = serde_json::from_str("\"task\"").unwrap();
        assert_eq!(kind, ResourceKind::Task);
        assert_eq!(ResourceKind::Task.to_string(), "task");
    }
}
