/// Access gate
///
/// A pure decision function consulted before every mutation and every
/// restricted read. The gate never touches the database: services load the
/// facts it needs (owner ids, whether the actor is a member, whether a share
/// reaches the actor) and pass them in as a [`Target`].
///
/// # Policy
///
/// | Action      | Target     | Allowed when                                      |
/// |-------------|------------|---------------------------------------------------|
/// | `Read`      | resource   | actor owns it, or a share reaches one of its groups |
/// | `Write`     | resource   | actor owns it                                     |
/// | `Delete`    | resource   | actor owns it                                     |
/// | `Read`      | group      | actor is a member                                 |
/// | `Write`     | group      | actor owns it (invite, remove members)            |
/// | `Delete`    | group      | actor owns it                                     |
/// | `Leave`     | group      | actor is a member and not the owner               |
/// | `Share`     | resource   | actor owns it (inspect its share edges)           |
/// | `Share`     | share      | actor owns the resource and is a group member     |
/// | `Unshare`   | share      | actor owns the resource or owns the group         |
///
/// Every other combination is denied.
///
/// # Example
///
/// ```
/// use groupshare_shared::auth::authorization::{can, Action, ResourceFacts, Target};
/// use groupshare_shared::models::resource::ResourceKind;
/// use uuid::Uuid;
///
/// let owner = Uuid::new_v4();
/// let member = Uuid::new_v4();
///
/// let shared = ResourceFacts { kind: ResourceKind::File, owner_id: owner, shared_with_actor: true };
/// assert!(can(member, Action::Read, &Target::Resource(shared)));
/// assert!(!can(member, Action::Delete, &Target::Resource(shared)));
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Delete,
    Leave,
    Share,
    Unshare,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "modify",
            Action::Delete => "delete",
            Action::Leave => "leave",
            Action::Share => "share",
            Action::Unshare => "unshare",
        }
    }
}

/// What the gate needs to know about a file or task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceFacts {
    pub kind: ResourceKind,
    pub owner_id: Uuid,

    /// The resource is shared with at least one group the actor belongs to
    pub shared_with_actor: bool,
}

impl ResourceFacts {
    /// Facts for decisions that only depend on ownership
    pub fn owned_by(kind: ResourceKind, owner_id: Uuid) -> Self {
        Self {
            kind,
            owner_id,
            shared_with_actor: false,
        }
    }
}

/// What the gate needs to know about a group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupFacts {
    pub owner_id: Uuid,
    pub actor_is_member: bool,
}

impl GroupFacts {
    /// Facts for decisions that only depend on ownership
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            actor_is_member: false,
        }
    }
}

/// Object of an access decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Resource(ResourceFacts),
    Group(GroupFacts),
    Share {
        resource: ResourceFacts,
        group: GroupFacts,
    },
}

impl Target {
    fn noun(&self) -> &'static str {
        match self {
            Target::Resource(facts) => facts.kind.as_str(),
            Target::Group(_) => "group",
            Target::Share { resource, .. } => resource.kind.as_str(),
        }
    }
}

/// Decides whether `actor` may perform `action` on `target`
pub fn can(actor: Uuid, action: Action, target: &Target) -> bool {
    match (action, target) {
        (Action::Read, Target::Resource(r)) => r.owner_id == actor || r.shared_with_actor,
        (Action::Write | Action::Delete | Action::Share, Target::Resource(r)) => r.owner_id == actor,

        (Action::Read, Target::Group(g)) => g.actor_is_member,
        (Action::Write | Action::Delete, Target::Group(g)) => g.owner_id == actor,
        (Action::Leave, Target::Group(g)) => g.actor_is_member && g.owner_id != actor,

        (Action::Share, Target::Share { resource, group }) => {
            resource.owner_id == actor && group.actor_is_member
        }
        (Action::Unshare, Target::Share { resource, group }) => {
            resource.owner_id == actor || group.owner_id == actor
        }

        _ => false,
    }
}

/// Like [`can`], but returns `CoreError::Forbidden` on denial
pub fn require(actor: Uuid, action: Action, target: &Target) -> CoreResult<()> {
    if can(actor, action, target) {
        return Ok(());
    }

    let reason = match (action, target) {
        (Action::Leave, Target::Group(g)) if g.owner_id == actor => {
            "the group owner cannot leave; delete the group instead".to_string()
        }
        (Action::Share, Target::Share { resource, .. }) if resource.owner_id == actor => {
            "can only share with groups you are a member of".to_string()
        }
        _ => format!("not permitted to {} this {}", action.as_str(), target.noun()),
    };

    Err(CoreError::Forbidden(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(owner_id: Uuid, shared_with_actor: bool) -> ResourceFacts {
        ResourceFacts {
            kind: ResourceKind::File,
            owner_id,
            shared_with_actor,
        }
    }

    fn group(owner_id: Uuid, actor_is_member: bool) -> GroupFacts {
        GroupFacts {
            owner_id,
            actor_is_member,
        }
    }

    #[test]
    fn test_owner_has_full_resource_access() {
        let owner = Uuid::new_v4();
        let target = Target::Resource(file(owner, false));

        for action in [Action::Read, Action::Write, Action::Delete] {
            assert!(can(owner, action, &target), "owner denied {:?}", action);
        }
    }

    #[test]
    fn test_share_grants_read_only() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let target = Target::Resource(file(owner, true));

        assert!(can(member, Action::Read, &target));
        assert!(!can(member, Action::Write, &target));
        assert!(!can(member, Action::Delete, &target));
    }

    #[test]
    fn test_stranger_cannot_read() {
        let target = Target::Resource(file(Uuid::new_v4(), false));
        assert!(!can(Uuid::new_v4(), Action::Read, &target));
    }

    #[test]
    fn test_group_administration_is_owner_only() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();

        let as_owner = Target::Group(group(owner, true));
        let as_member = Target::Group(group(owner, true));

        assert!(can(owner, Action::Write, &as_owner));
        assert!(can(owner, Action::Delete, &as_owner));
        assert!(can(member, Action::Read, &as_member));
        assert!(!can(member, Action::Write, &as_member));
        assert!(!can(member, Action::Delete, &as_member));
    }

    #[test]
    fn test_owner_cannot_leave() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();

        assert!(!can(owner, Action::Leave, &Target::Group(group(owner, true))));
        assert!(can(member, Action::Leave, &Target::Group(group(owner, true))));
        assert!(!can(member, Action::Leave, &Target::Group(group(owner, false))));

        let err = require(owner, Action::Leave, &Target::Group(group(owner, true))).unwrap_err();
        assert!(err.to_string().contains("owner cannot leave"));
    }

    #[test]
    fn test_share_requires_resource_owner_in_group() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let group_owner = Uuid::new_v4();

        let in_group = Target::Share {
            resource: file(owner, false),
            group: group(group_owner, true),
        };
        let outside = Target::Share {
            resource: file(owner, false),
            group: group(group_owner, false),
        };

        assert!(can(owner, Action::Share, &in_group));
        assert!(!can(owner, Action::Share, &outside));
        assert!(!can(other, Action::Share, &in_group));
        assert!(matches!(
            require(owner, Action::Share, &outside),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_share_listing_is_owner_only() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();

        assert!(can(owner, Action::Share, &Target::Resource(file(owner, false))));
        assert!(!can(member, Action::Share, &Target::Resource(file(owner, true))));
    }

    #[test]
    fn test_unshare_by_resource_or_group_owner() {
        let resource_owner = Uuid::new_v4();
        let group_owner = Uuid::new_v4();
        let member = Uuid::new_v4();

        let target = Target::Share {
            resource: file(resource_owner, true),
            group: group(group_owner, true),
        };

        assert!(can(resource_owner, Action::Unshare, &target));
        assert!(can(group_owner, Action::Unshare, &target));
        assert!(!can(member, Action::Unshare, &target));
    }

    #[test]
    fn test_mismatched_pairs_are_denied() {
        let actor = Uuid::new_v4();

        assert!(!can(actor, Action::Unshare, &Target::Resource(file(actor, false))));
        assert!(!can(actor, Action::Leave, &Target::Resource(file(actor, false))));
        assert!(!can(actor, Action::Share, &Target::Group(group(actor, true))));
        assert!(!can(actor, Action::Read, &Target::Share {
            resource: file(actor, false),
            group: group(actor, true),
        }));
    }

    #[test]
    fn test_require_message_names_target() {
        let err = require(
            Uuid::new_v4(),
            Action::Delete,
            &Target::Resource(ResourceFacts {
                kind: ResourceKind::Task,
                owner_id: Uuid::new_v4(),
                shared_with_actor: true,
            }),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Forbidden: not permitted to delete this task");
    }
}
