/// Sharing engine
///
/// A share edge grants read visibility of one resource to every current
/// member of one group. Edges are written with `ON CONFLICT DO NOTHING`, so
/// sharing twice (or two racing shares) leaves exactly one edge.

use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::authorization::{require, Action, GroupFacts, ResourceFacts, Target};
use crate::error::{is_foreign_key_violation, violated_constraint, CoreError, CoreResult};
use crate::models::resource::{self, Resource, ResourceKind};
use crate::models::share::{Share, SharedGroup};

use super::membership::{group_facts, load_group};

async fn resource_owner(pool: &PgPool, kind: ResourceKind, resource_id: Uuid) -> CoreResult<Uuid> {
    resource::owner_of(pool, kind, resource_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(kind.label().to_string()))
}

fn translate_share_error(kind: ResourceKind, error: sqlx::Error) -> CoreError {
    if !is_foreign_key_violation(&error) {
        return CoreError::Database(error);
    }

    match violated_constraint(&error) {
        Some(name) if name.ends_with("group_id_fkey") => CoreError::NotFound("Group".to_string()),
        _ => CoreError::NotFound(kind.label().to_string()),
    }
}

/// Shares a resource with a group
///
/// Returns true if a new edge was created, false if it already existed.
///
/// # Errors
///
/// - `NotFound` if the resource or group doesn't exist
/// - `Forbidden` unless `actor` owns the resource and is a member of the group
pub async fn share(
    pool: &PgPool,
    actor: Uuid,
    kind: ResourceKind,
    resource_id: Uuid,
    group_id: Uuid,
) -> CoreResult<bool> {
    let owner_id = resource_owner(pool, kind, resource_id).await?;
    let group = load_group(pool, group_id).await?;

    let target = Target::Share {
        resource: ResourceFacts::owned_by(kind, owner_id),
        group: group_facts(pool, &group, actor).await?,
    };
    require(actor, Action::Share, &target)?;

    let created = Share::create(pool, kind, resource_id, group.id)
        .await
        .map_err(|e| translate_share_error(kind, e))?;

    if created {
        info!(%kind, resource_id = %resource_id, group_id = %group.id, shared_by = %actor, "Resource shared");
    } else {
        debug!(%kind, resource_id = %resource_id, group_id = %group.id, "Resource already shared");
    }

    Ok(created)
}

/// Removes a share edge
///
/// # Errors
///
/// - `NotFound` if the resource or group doesn't exist
/// - `Forbidden` unless `actor` owns the resource or the group
/// - `NotShared` if no edge exists
pub async fn unshare(
    pool: &PgPool,
    actor: Uuid,
    kind: ResourceKind,
    resource_id: Uuid,
    group_id: Uuid,
) -> CoreResult<()> {
    let owner_id = resource_owner(pool, kind, resource_id).await?;
    let group = load_group(pool, group_id).await?;

    let target = Target::Share {
        resource: ResourceFacts::owned_by(kind, owner_id),
        group: GroupFacts::owned_by(group.owner_id),
    };
    require(actor, Action::Unshare, &target)?;

    if !Share::delete(pool, kind, resource_id, group.id).await? {
        return Err(CoreError::NotShared {
            resource_id,
            group_id: group.id,
        });
    }

    info!(%kind, resource_id = %resource_id, group_id = %group.id, unshared_by = %actor, "Resource unshared");
    Ok(())
}

/// Resources owned by `user` plus those shared into any of their groups,
/// each listed once
pub async fn visible_to<R: Resource>(pool: &PgPool, user: Uuid) -> CoreResult<Vec<R>> {
    let items = resource::list_visible_to::<R>(pool, user).await?;
    debug!(user_id = %user, kind = %R::KIND, count = items.len(), "Listed visible resources");
    Ok(items)
}

/// Groups a resource is shared with; owner only
pub async fn list_shares(
    pool: &PgPool,
    actor: Uuid,
    kind: ResourceKind,
    resource_id: Uuid,
) -> CoreResult<Vec<SharedGroup>> {
    let owner_id = resource_owner(pool, kind, resource_id).await?;
    require(actor, Action::Share, &Target::Resource(ResourceFacts::owned_by(kind, owner_id)))?;

    Ok(Share::list_groups(pool, kind, resource_id).await?)
}
