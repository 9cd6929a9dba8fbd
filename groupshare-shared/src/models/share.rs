/// Share edges between resources and groups
///
/// Files and tasks keep their edges in separate tables (`file_shares`,
/// `task_shares`) with the same shape. Every function here takes a
/// [`ResourceKind`] and addresses the matching table, so the sharing rules
/// live in one place.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE file_shares (
///     file_id UUID NOT NULL REFERENCES files(id) ON DELETE CASCADE,
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     shared_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT file_shares_pkey PRIMARY KEY (file_id, group_id)
/// );
/// -- task_shares is identical with task_id
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::resource::ResourceKind;

/// A group a resource is shared with, as returned to the resource owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SharedGroup {
    pub group_id: Uuid,
    pub group_name: String,
    pub shared_at: DateTime<Utc>,
}

/// Namespace for share edge queries
pub struct Share;

impl Share {
    /// Inserts a share edge, leaving an existing edge untouched
    ///
    /// Returns true if a new edge was written, false if it already existed.
    ///
    /// # Errors
    ///
    /// Foreign key violation if the resource or group was deleted
    /// concurrently.
    pub async fn create<'e, E>(
        executor: E,
        kind: ResourceKind,
        resource_id: Uuid,
        group_id: Uuid,
    ) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!(
            "INSERT INTO {} ({}, group_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            kind.share_table(),
            kind.share_column()
        );

        let result = sqlx::query(&sql)
            .bind(resource_id)
            .bind(group_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a share edge
    ///
    /// Returns true if an edge was deleted, false if none existed.
    pub async fn delete(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Uuid,
        group_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND group_id = $2",
            kind.share_table(),
            kind.share_column()
        );

        let result = sqlx::query(&sql)
            .bind(resource_id)
            .bind(group_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Checks whether a specific edge exists
    pub async fn exists(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Uuid,
        group_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND group_id = $2)",
            kind.share_table(),
            kind.share_column()
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(resource_id)
            .bind(group_id)
            .fetch_one(pool)
            .await
    }

    /// Counts edges for one resource
    pub async fn count_for_resource(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            kind.share_table(),
            kind.share_column()
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(resource_id)
            .fetch_one(pool)
            .await
    }

    /// Counts edges of both kinds pointing at a group
    pub async fn count_for_group(pool: &PgPool, group_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT (SELECT COUNT(*) FROM file_shares WHERE group_id = $1)
                 + (SELECT COUNT(*) FROM task_shares WHERE group_id = $1)
            "#,
        )
        .bind(group_id)
        .fetch_one(pool)
        .await
    }

    /// Lists the groups a resource is shared with, oldest edge first
    pub async fn list_groups(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> Result<Vec<SharedGroup>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT g.id AS group_id, g.name AS group_name, s.shared_at
            FROM {shares} s
            JOIN groups g ON g.id = s.group_id
            WHERE s.{col} = $1
            ORDER BY s.shared_at ASC, g.id ASC
            "#,
            shares = kind.share_table(),
            col = kind.share_column(),
        );

        sqlx::query_as::<_, SharedGroup>(&sql)
            .bind(resource_id)
            .fetch_all(pool)
            .await
    }

    /// Whether the user can reach the resource through any group they belong to
    pub async fn reachable_via_group(
        pool: &PgPool,
        kind: ResourceKind,
        resource_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM {shares} s
                JOIN memberships m ON m.group_id = s.group_id
                WHERE s.{col} = $1 AND m.user_id = $2
            )
            "#,
            shares = kind.share_table(),
            col = kind.share_column(),
        );

        sqlx::query_scalar::<_, bool>(&sql)
            .bind(resource_id)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
