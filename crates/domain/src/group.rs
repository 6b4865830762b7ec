//! Study groups and their membership.
//!
//! A group document carries its member list inline. Membership checks,
//! role lookups and the statistics engine all read from that array, so the
//! mutation helpers here are the only place its invariants are enforced:
//! a user appears at most once, and there is exactly one owner.

use crate::errors::GroupError;
use crate::identifiers::{GroupId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Study group document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub invite_code: String,
    pub owner_id: UserId,
    pub members: Vec<GroupMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Embedded membership record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub user_id: UserId,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Role of a member inside a single group
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupRole {
    Member = 0,
    Admin = 1,
    Owner = 2,
}

impl GroupRole {
    /// Owners and admins can edit the group, manage questions and members.
    pub fn can_manage(&self) -> bool {
        *self >= Self::Admin
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }
}

impl std::fmt::Display for GroupRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Group {
    /// Create a group with `owner_id` as its only member.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        owner_id: UserId,
        invite_code: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: GroupId::new(),
            name: name.into(),
            description: description.into(),
            invite_code: invite_code.into(),
            owner_id,
            members: vec![GroupMember {
                user_id: owner_id,
                role: GroupRole::Owner,
                joined_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(&self, user_id: UserId) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn role_of(&self, user_id: UserId) -> Option<GroupRole> {
        self.member(user_id).map(|m| m.role)
    }

    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<UserId> {
        self.members.iter().map(|m| m.user_id).collect()
    }

    /// Add a member. Fails if the user is already in the group or the
    /// group has reached `max_members`.
    pub fn add_member(
        &mut self,
        user_id: UserId,
        role: GroupRole,
        max_members: usize,
    ) -> Result<(), GroupError> {
        if self.is_member(user_id) {
            return Err(GroupError::AlreadyMember);
        }
        if self.members.len() >= max_members {
            return Err(GroupError::GroupFull { max: max_members });
        }
        if role == GroupRole::Owner {
            return Err(GroupError::InvalidRoleChange(
                "ownership can only be transferred".to_string(),
            ));
        }

        let now = Utc::now();
        self.members.push(GroupMember {
            user_id,
            role,
            joined_at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Remove a member. The owner can never be removed.
    pub fn remove_member(&mut self, user_id: UserId) -> Result<GroupMember, GroupError> {
        let index = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or(GroupError::NotMember)?;

        if self.members[index].role == GroupRole::Owner {
            return Err(GroupError::OwnerCannotLeave);
        }

        self.updated_at = Utc::now();
        Ok(self.members.remove(index))
    }

    /// Change a non-owner member's role between `Admin` and `Member`.
    pub fn set_role(&mut self, user_id: UserId, role: GroupRole) -> Result<(), GroupError> {
        if role == GroupRole::Owner {
            return Err(GroupError::InvalidRoleChange(
                "use ownership transfer to assign a new owner".to_string(),
            ));
        }

        let member = self
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or(GroupError::NotMember)?;

        if member.role == GroupRole::Owner {
            return Err(GroupError::InvalidRoleChange(
                "the owner's role cannot be changed".to_string(),
            ));
        }

        member.role = role;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Hand ownership to another member; the previous owner becomes an admin.
    pub fn transfer_ownership(&mut self, new_owner: UserId) -> Result<(), GroupError> {
        if new_owner == self.owner_id {
            return Err(GroupError::InvalidRoleChange(
                "user already owns this group".to_string(),
            ));
        }
        if !self.is_member(new_owner) {
            return Err(GroupError::NotMember);
        }

        let previous = self.owner_id;
        for member in &mut self.members {
            if member.user_id == previous {
                member.role = GroupRole::Admin;
            } else if member.user_id == new_owner {
                member.role = GroupRole::Owner;
            }
        }
        self.owner_id = new_owner;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_owner() -> (Group, UserId) {
        let owner = UserId::new();
        (Group::new("Daily Grind", "", owner, "ABCD2345"), owner)
    }

    #[test]
    fn test_new_group_has_owner_member() {
        let (group, owner) = group_with_owner();
        assert_eq!(group.member_count(), 1);
        assert_eq!(group.role_of(owner), Some(GroupRole::Owner));
    }

    #[test]
    fn test_add_member_rejects_duplicates_and_full_groups() {
        let (mut group, owner) = group_with_owner();
        assert!(matches!(
            group.add_member(owner, GroupRole::Member, 10),
            Err(GroupError::AlreadyMember)
        ));

        let user = UserId::new();
        group.add_member(user, GroupRole::Member, 2).unwrap();
        assert!(matches!(
            group.add_member(UserId::new(), GroupRole::Member, 2),
            Err(GroupError::GroupFull { max: 2 })
        ));
    }

    #[test]
    fn test_owner_cannot_be_removed() {
        let (mut group, owner) = group_with_owner();
        assert!(matches!(
            group.remove_member(owner),
            Err(GroupError::OwnerCannotLeave)
        ));
        assert!(matches!(
            group.remove_member(UserId::new()),
            Err(GroupError::NotMember)
        ));
    }

    #[test]
    fn test_set_role_guards_owner() {
        let (mut group, owner) = group_with_owner();
        let user = UserId::new();
        group.add_member(user, GroupRole::Member, 10).unwrap();

        group.set_role(user, GroupRole::Admin).unwrap();
        assert_eq!(group.role_of(user), Some(GroupRole::Admin));

        assert!(group.set_role(owner, GroupRole::Member).is_err());
        assert!(group.set_role(user, GroupRole::Owner).is_err());
    }

    #[test]
    fn test_transfer_ownership() {
        let (mut group, owner) = group_with_owner();
        let user = UserId::new();
        group.add_member(user, GroupRole::Member, 10).unwrap();

        group.transfer_ownership(user).unwrap();
        assert_eq!(group.owner_id, user);
        assert_eq!(group.role_of(user), Some(GroupRole::Owner));
        assert_eq!(group.role_of(owner), Some(GroupRole::Admin));
        assert_eq!(
            group.members.iter().filter(|m| m.role == GroupRole::Owner).count(),
            1
        );
    }

    #[test]
    fn test_role_can_manage() {
        assert!(GroupRole::Owner.can_manage());
        assert!(GroupRole::Admin.can_manage());
        assert!(!GroupRole::Member.can_manage());
    }
}
