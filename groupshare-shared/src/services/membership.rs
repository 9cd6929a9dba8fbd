/// Membership graph: groups and membership edges
///
/// Administrative actions (invite, remove, delete) belong to the group owner.
/// The owner's own edge is created together with the group and can only
/// disappear when the group is deleted.

use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::authorization::{require, Action, GroupFacts, Target};
use crate::error::{is_foreign_key_violation, is_unique_violation, CoreError, CoreResult};
use crate::models::group::{CreateGroup, Group};
use crate::models::membership::{Member, Membership};
use crate::models::user::User;

pub(crate) async fn load_group(pool: &PgPool, group_id: Uuid) -> CoreResult<Group> {
    Group::find_by_id(pool, group_id)
        .await?
        .ok_or_else(|| CoreError::NotFound("Group".to_string()))
}

pub(crate) async fn group_facts(pool: &PgPool, group: &Group, actor: Uuid) -> CoreResult<GroupFacts> {
    Ok(GroupFacts {
        owner_id: group.owner_id,
        actor_is_member: Membership::exists(pool, group.id, actor).await?,
    })
}

/// Creates a group owned by `actor` and inserts the owner's membership edge
/// in the same transaction
pub async fn create_group(pool: &PgPool, actor: Uuid, name: &str, description: &str) -> CoreResult<Group> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::InvalidInput("group name is required".to_string()));
    }

    let mut tx = pool.begin().await?;

    let group = Group::create(
        &mut *tx,
        CreateGroup {
            name: name.to_string(),
            description: description.trim().to_string(),
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

    Membership::create(&mut *tx, group.id, actor).await?;
    tx.commit().await?;

    info!(group_id = %group.id, owner_id = %actor, name = %group.name, "Group created");
    Ok(group)
}

/// Adds the user registered under `email` to the group
///
/// # Errors
///
/// - `NotFound` if the group or the email doesn't exist
/// - `Forbidden` unless `actor` owns the group
/// - `AlreadyMember` if the edge exists
pub async fn invite(pool: &PgPool, actor: Uuid, group_id: Uuid, email: &str) -> CoreResult<Membership> {
    let group = load_group(pool, group_id).await?;
    require(actor, Action::Write, &Target::Group(GroupFacts::owned_by(group.owner_id)))?;

    let user = User::find_by_email(pool, email.trim())
        .await?
        .ok_or_else(|| CoreError::NotFound("User".to_string()))?;

    let membership = Membership::create(pool, group.id, user.id).await.map_err(|e| {
        if is_unique_violation(&e) {
            CoreError::AlreadyMember {
                group_id: group.id,
                user_id: user.id,
            }
        } else if is_foreign_key_violation(&e) {
            CoreError::NotFound("Group".to_string())
        } else {
            CoreError::Database(e)
        }
    })?;

    info!(group_id = %group.id, user_id = %user.id, invited_by = %actor, "Member invited");
    Ok(membership)
}

/// Removes `target_user` from the group
///
/// A member removing themself is treated as [`leave`], so the owner can only
/// ever reach this as its own target and is refused there.
///
/// # Errors
///
/// - `NotFound` if the group or the edge doesn't exist
/// - `Forbidden` unless `actor` owns the group
pub async fn remove_member(pool: &PgPool, actor: Uuid, group_id: Uuid, target_user: Uuid) -> CoreResult<()> {
    if actor == target_user {
        return leave(pool, actor, group_id).await;
    }

    let group = load_group(pool, group_id).await?;
    require(actor, Action::Write, &Target::Group(GroupFacts::owned_by(group.owner_id)))?;

    if !Membership::delete(pool, group.id, target_user).await? {
        return Err(CoreError::NotFound("Membership".to_string()));
    }

    info!(group_id = %group.id, user_id = %target_user, removed_by = %actor, "Member removed");
    Ok(())
}

/// Deletes the actor's own membership edge
///
/// # Errors
///
/// - `NotFound` if the group doesn't exist
/// - `NotInGroup` if the actor holds no edge
/// - `Forbidden` if the actor owns the group
pub async fn leave(pool: &PgPool, actor: Uuid, group_id: Uuid) -> CoreResult<()> {
    let group = load_group(pool, group_id).await?;
    let facts = group_facts(pool, &group, actor).await?;

    if !facts.actor_is_member {
        return Err(CoreError::NotInGroup(group.id));
    }
    require(actor, Action::Leave, &Target::Group(facts))?;

    if !Membership::delete(pool, group.id, actor).await? {
        // Lost a race with a concurrent leave/removal
        return Err(CoreError::NotInGroup(group.id));
    }

    info!(group_id = %group.id, user_id = %actor, "Member left group");
    Ok(())
}

/// Deletes a group and, through FK cascades in the same statement, every
/// membership and share edge referencing it
pub async fn delete_group(pool: &PgPool, actor: Uuid, group_id: Uuid) -> CoreResult<()> {
    let group = load_group(pool, group_id).await?;
    require(actor, Action::Delete, &Target::Group(GroupFacts::owned_by(group.owner_id)))?;

    if !Group::delete(pool, group.id).await? {
        return Err(CoreError::NotFound("Group".to_string()));
    }

    info!(group_id = %group.id, owner_id = %actor, "Group deleted");
    Ok(())
}

/// Groups in which `user` holds a membership edge
pub async fn list_groups(pool: &PgPool, user: Uuid) -> CoreResult<Vec<Group>> {
    let groups = Group::list_for_member(pool, user).await?;
    debug!(user_id = %user, count = groups.len(), "Listed groups");
    Ok(groups)
}

/// Members of a group, visible to any member
pub async fn list_members(pool: &PgPool, actor: Uuid, group_id: Uuid) -> CoreResult<Vec<Member>> {
    let group = load_group(pool, group_id).await?;
    let facts = group_facts(pool, &group, actor).await?;

    if let Err(e) = require(actor, Action::Read, &Target::Group(facts)) {
        warn!(group_id = %group.id, user_id = %actor, "Member listing denied");
        return Err(e);
    }

    Ok(Membership::list_members(pool, group.id).await?)
}
