//! Group DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use studyhub_domain::{Group, GroupId, GroupMember, GroupRole, UserId, UserSummary};

/// A group as seen by one of its members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDto {
    pub id: GroupId,
    pub name: String,
    pub description: String,
    /// Only shown to owners and admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    pub owner_id: UserId,
    pub member_count: u32,
    /// The caller's role, if they are a member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_role: Option<GroupRole>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GroupDto {
    /// Build the view for a caller whose effective role is `role`.
    pub fn for_role(group: &Group, role: Option<GroupRole>) -> Self {
        let can_manage = role.map(|r| r.can_manage()).unwrap_or(false);
        Self {
            id: group.id,
            name: group.name.clone(),
            description: group.description.clone(),
            invite_code: can_manage.then(|| group.invite_code.clone()),
            owner_id: group.owner_id,
            member_count: group.member_count() as u32,
            my_role: role,
            created_at: group.created_at,
            updated_at: group.updated_at,
        }
    }
}

/// A member with their public profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberDto {
    pub user: UserSummary,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

impl MemberDto {
    pub fn new(member: &GroupMember, user: UserSummary) -> Self {
        Self {
            user,
            role: member.role,
            joined_at: member.joined_at,
        }
    }

    /// Join every member with its user summary, owner first then by join
    /// time. Members whose account no longer exists are skipped.
    pub fn list(group: &Group, users: &HashMap<UserId, UserSummary>) -> Vec<Self> {
        let mut members: Vec<Self> = group
            .members
            .iter()
            .filter_map(|m| users.get(&m.user_id).map(|u| Self::new(m, u.clone())))
            .collect();
        members.sort_by(|a, b| {
            b.role
                .cmp(&a.role)
                .then_with(|| a.joined_at.cmp(&b.joined_at))
        });
        members
    }
}

/// Returned after regenerating an invite code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCodeDto {
    pub invite_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhub_domain::User;

    #[test]
    fn test_invite_code_only_for_managers() {
        let owner = UserId::new();
        let group = Group::new("Graphs", "", owner, "ABCDEFGH");

        let dto = GroupDto::for_role(&group, Some(GroupRole::Member));
        assert!(dto.invite_code.is_none());

        let dto = GroupDto::for_role(&group, Some(GroupRole::Admin));
        assert_eq!(dto.invite_code.as_deref(), Some("ABCDEFGH"));
        assert_eq!(dto.member_count, 1);
    }

    #[test]
    fn test_member_list_owner_first() {
        let owner = User::new("o@example.com", "owner", "Owner", "h");
        let member = User::new("m@example.com", "member", "Member", "h");
        let mut group = Group::new("Graphs", "", owner.id, "ABCDEFGH");
        group.add_member(member.id, GroupRole::Member, 10).unwrap();
        // make the owner's membership look newer than the member's
        group.members[0].joined_at = group.members[1].joined_at + chrono::Duration::hours(1);

        let users: HashMap<_, _> = [&owner, &member]
            .iter()
            .map(|u| (u.id, u.summary()))
            .collect();
        let list = MemberDto::list(&group, &users);
        assert_eq!(list[0].user.username, "owner");
        assert_eq!(list[1].role, GroupRole::Member);
    }
}
