/// Membership model and database operations
///
/// A membership is a plain `(group_id, user_id)` edge. The primary key makes
/// duplicate edges impossible, so inviting the same user twice surfaces as a
/// unique violation instead of a second row.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT memberships_pkey PRIMARY KEY (group_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Membership edge between a user and a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Member listing row (membership joined with the user's public fields)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    /// Inserts a membership edge
    ///
    /// # Errors
    ///
    /// - unique violation on `memberships_pkey` if the edge already exists
    /// - foreign key violation if the group or user doesn't exist
    pub async fn create<'e, E>(executor: E, group_id: Uuid, user_id: Uuid) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (group_id, user_id)
            VALUES ($1, $2)
            RETURNING group_id, user_id, joined_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;

        Ok(membership)
    }

    /// Checks whether the user holds an edge into the group
    pub async fn exists(pool: &PgPool, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE group_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Deletes a membership edge
    ///
    /// Returns true if an edge was deleted, false if none existed.
    pub async fn delete(pool: &PgPool, group_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM memberships WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists members of a group in join order
    pub async fn list_members(pool: &PgPool, group_id: Uuid) -> Result<Vec<Member>, sqlx::Error> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT u.id AS user_id, u.username, u.email, m.joined_at
            FROM memberships m
            JOIN users u ON u.id = m.user_id
            WHERE m.group_id = $1
            ORDER BY m.joined_at ASC, u.username ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts edges into a group
    pub async fn count_by_group(pool: &PgPool, group_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
