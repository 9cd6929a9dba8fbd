//! Integration tests for the identity store and membership graph
//!
//! Require PostgreSQL via `DATABASE_URL`; skipped otherwise.

mod common;

use groupshare_shared::error::CoreError;
use bytes::Bytes;
use groupshare_shared::models::file::File;
use groupshare_shared::models::membership::Membership;
use groupshare_shared::models::resource::ResourceKind;
use groupshare_shared::models::share::Share;
use groupshare_shared::models::task::Task;
use groupshare_shared::services::{catalog, identity, membership, sharing};
use groupshare_shared::storage::{MemoryBlobStore, UploadPolicy};
use uuid::Uuid;

#[tokio::test]
async fn test_duplicate_email_registration_conflicts() {
    let Some(pool) = common::test_pool().await else { return };

    let first = common::register_user(&pool, "dup").await;
    let result = identity::register(&pool, "someone_else_entirely", &first.email, common::PASSWORD).await;

    assert!(matches!(result, Err(CoreError::Conflict(ref m)) if m.contains("email")));

    // First account is untouched and can still log in
    let again = identity::authenticate(&pool, &first.email, common::PASSWORD).await.unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.username, first.username);
}

#[tokio::test]
async fn test_duplicate_username_registration_conflicts() {
    let Some(pool) = common::test_pool().await else { return };

    let first = common::register_user(&pool, "name").await;
    let email = format!("{}@other.test", Uuid::new_v4().simple());
    let result = identity::register(&pool, &first.username, &email, common::PASSWORD).await;

    assert!(matches!(result, Err(CoreError::Conflict(ref m)) if m.contains("username")));
}

#[tokio::test]
async fn test_authenticate_by_email_or_username() {
    let Some(pool) = common::test_pool().await else { return };
    let user = common::register_user(&pool, "login").await;

    assert_eq!(identity::authenticate(&pool, &user.email, common::PASSWORD).await.unwrap().id, user.id);
    assert_eq!(identity::authenticate(&pool, &user.username, common::PASSWORD).await.unwrap().id, user.id);

    assert!(matches!(
        identity::authenticate(&pool, &user.email, "wrong-password").await,
        Err(CoreError::Unauthenticated(_))
    ));
    assert!(matches!(
        identity::authenticate(&pool, "nobody@example.test", common::PASSWORD).await,
        Err(CoreError::Unauthenticated(_))
    ));
}

#[tokio::test]
async fn test_change_password() {
    let Some(pool) = common::test_pool().await else { return };
    let user = common::register_user(&pool, "pw").await;

    assert!(matches!(
        identity::change_password(&pool, user.id, "not-the-password", "new-password-1").await,
        Err(CoreError::Unauthenticated(_))
    ));

    identity::change_password(&pool, user.id, common::PASSWORD, "new-password-1").await.unwrap();

    assert!(identity::authenticate(&pool, &user.email, common::PASSWORD).await.is_err());
    assert!(identity::authenticate(&pool, &user.email, "new-password-1").await.is_ok());
}

#[tokio::test]
async fn test_create_group_adds_owner_membership() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;

    let group = membership::create_group(&pool, owner.id, "Team", "the team").await.unwrap();

    assert_eq!(group.owner_id, owner.id);
    assert!(Membership::exists(&pool, group.id, owner.id).await.unwrap());
    assert_eq!(Membership::count_by_group(&pool, group.id).await.unwrap(), 1);

    let groups = membership::list_groups(&pool, owner.id).await.unwrap();
    assert!(groups.iter().any(|g| g.id == group.id));
}

#[tokio::test]
async fn test_invite_rules() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;
    let bob = common::register_user(&pool, "bob").await;
    let carol = common::register_user(&pool, "carol").await;
    let group = membership::create_group(&pool, owner.id, "Team", "").await.unwrap();

    membership::invite(&pool, owner.id, group.id, &bob.email).await.unwrap();
    assert!(Membership::exists(&pool, group.id, bob.id).await.unwrap());

    // Second invite hits the primary key
    assert!(matches!(
        membership::invite(&pool, owner.id, group.id, &bob.email).await,
        Err(CoreError::AlreadyMember { user_id, .. }) if user_id == bob.id
    ));

    // Unknown email and unknown group
    assert!(matches!(
        membership::invite(&pool, owner.id, group.id, "ghost@example.test").await,
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        membership::invite(&pool, owner.id, Uuid::new_v4(), &carol.email).await,
        Err(CoreError::NotFound(_))
    ));

    // Members cannot invite
    assert!(matches!(
        membership::invite(&pool, bob.id, group.id, &carol.email).await,
        Err(CoreError::Forbidden(_))
    ));
    assert_eq!(Membership::count_by_group(&pool, group.id).await.unwrap(), 2);
}

#[tokio::test]
async fn test_leave_rules() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;
    let bob = common::register_user(&pool, "bob").await;
    let group = membership::create_group(&pool, owner.id, "Team", "").await.unwrap();

    assert!(matches!(
        membership::leave(&pool, owner.id, group.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        membership::leave(&pool, bob.id, group.id).await,
        Err(CoreError::NotInGroup(id)) if id == group.id
    ));

    membership::invite(&pool, owner.id, group.id, &bob.email).await.unwrap();
    membership::leave(&pool, bob.id, group.id).await.unwrap();
    assert!(!Membership::exists(&pool, group.id, bob.id).await.unwrap());

    assert!(matches!(
        membership::leave(&pool, bob.id, Uuid::new_v4()).await,
        Err(CoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_remove_member_rules() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;
    let bob = common::register_user(&pool, "bob").await;
    let carol = common::register_user(&pool, "carol").await;
    let group = membership::create_group(&pool, owner.id, "Team", "").await.unwrap();
    membership::invite(&pool, owner.id, group.id, &bob.email).await.unwrap();
    membership::invite(&pool, owner.id, group.id, &carol.email).await.unwrap();

    // Members cannot remove each other, nor the owner
    assert!(matches!(
        membership::remove_member(&pool, bob.id, group.id, carol.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        membership::remove_member(&pool, bob.id, group.id, owner.id).await,
        Err(CoreError::Forbidden(_))
    ));
    assert!(matches!(
        membership::remove_member(&pool, owner.id, group.id, owner.id).await,
        Err(CoreError::Forbidden(_))
    ));

    membership::remove_member(&pool, owner.id, group.id, carol.id).await.unwrap();
    assert!(matches!(
        membership::remove_member(&pool, owner.id, group.id, carol.id).await,
        Err(CoreError::NotFound(_))
    ));

    // Removing yourself is leaving
    membership::remove_member(&pool, bob.id, group.id, bob.id).await.unwrap();
    assert_eq!(Membership::count_by_group(&pool, group.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_list_members_requires_membership() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;
    let bob = common::register_user(&pool, "bob").await;
    let outsider = common::register_user(&pool, "out").await;
    let group = membership::create_group(&pool, owner.id, "Team", "").await.unwrap();
    membership::invite(&pool, owner.id, group.id, &bob.email).await.unwrap();

    let members = membership::list_members(&pool, bob.id, group.id).await.unwrap();
    let ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
    assert_eq!(ids, vec![owner.id, bob.id]);

    assert!(matches!(
        membership::list_members(&pool, outsider.id, group.id).await,
        Err(CoreError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_delete_group_is_owner_only_and_cascades() {
    let Some(pool) = common::test_pool().await else { return };
    let owner = common::register_user(&pool, "owner").await;
    let bob = common::register_user(&pool, "bob").await;
    let group = membership::create_group(&pool, owner.id, "Team", "").await.unwrap();
    membership::invite(&pool, owner.id, group.id, &bob.email).await.unwrap();

    let blobs = MemoryBlobStore::new();
    let file = catalog::upload_file(
        &pool,
        &blobs,
        &UploadPolicy::default(),
        owner.id,
        "plan.txt",
        Bytes::from_static(b"plan"),
    )
    .await
    .unwrap();
    let task = catalog::create_task(&pool, owner.id, "Kickoff", "").await.unwrap();
    assert!(sharing::share(&pool, owner.id, ResourceKind::File, file.id, group.id).await.unwrap());
    assert!(sharing::share(&pool, owner.id, ResourceKind::Task, task.id, group.id).await.unwrap());

    assert_eq!(Share::count_for_group(&pool, group.id).await.unwrap(), 2);
    assert_eq!(sharing::visible_to::<File>(&pool, bob.id).await.unwrap().len(), 1);
    assert_eq!(sharing::visible_to::<Task>(&pool, bob.id).await.unwrap().len(), 1);

    assert!(matches!(
        membership::delete_group(&pool, bob.id, group.id).await,
        Err(CoreError::Forbidden(_))
    ));

    membership::delete_group(&pool, owner.id, group.id).await.unwrap();

    assert_eq!(Membership::count_by_group(&pool, group.id).await.unwrap(), 0);
    assert_eq!(Share::count_for_group(&pool, group.id).await.unwrap(), 0);
    assert_eq!(Share::count_for_resource(&pool, ResourceKind::File, file.id).await.unwrap(), 0);
    assert_eq!(Share::count_for_resource(&pool, ResourceKind::Task, task.id).await.unwrap(), 0);
    assert!(sharing::visible_to::<File>(&pool, bob.id).await.unwrap().is_empty());
    assert!(sharing::visible_to::<Task>(&pool, bob.id).await.unwrap().is_empty());

    // The resources themselves survive with their owner
    assert_eq!(catalog::list_owned::<File>(&pool, owner.id).await.unwrap().len(), 1);
    assert_eq!(catalog::list_owned::<Task>(&pool, owner.id).await.unwrap().len(), 1);
    assert!(membership::list_groups(&pool, bob.id).await.unwrap().is_empty());
    assert!(matches!(
        membership::delete_group(&pool, owner.id, group.id).await,
        Err(CoreError::NotFound(_))
    ));
}
