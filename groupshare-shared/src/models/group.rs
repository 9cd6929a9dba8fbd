/// Group model and database operations
///
/// A group has exactly one owner. The owner's membership edge is inserted in
/// the same transaction as the group row (see
/// [`crate::services::membership::create_group`]), so `create` takes a generic
/// executor.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a group cascades to `memberships`, `file_shares` and `task_shares`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Named collection of users with a single owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: String,

    /// The only user allowed to delete the group or administer members
    pub owner_id: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a new group
#[derive(Debug, Clone)]
pub struct CreateGroup {
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
}

impl Group {
    /// Inserts a group row
    ///
    /// Does not create the owner's membership; use the membership service
    /// for the atomic pair.
    pub async fn create<'e, E>(executor: E, data: CreateGroup) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await?;

        Ok(group)
    }

    /// Finds a group by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, description, owner_id, created_at
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(group)
    }

    /// Deletes a group; memberships and share edges go with it
    ///
    /// Returns true if a row was deleted.
    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every group the user holds a membership edge in
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.name, g.description, g.owner_id, g.created_at
            FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY g.created_at ASC, g.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(groups)
    }
}
