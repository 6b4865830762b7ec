//! Group Service
//!
//! Study group lifecycle and membership: creation, invite codes, joining
//! and leaving, role management and ownership transfer.

use super::{
    emit, require_account, user_summaries, EventPublisher, GroupPolicy, QuestionRepositoryPort, ServiceConfig,
    ServiceContext, ServiceEvent, UserRepositoryPort,
};
use crate::dto::{GroupDto, InviteCodeDto, MemberDto};
use crate::validation::{
    CreateGroupRequest, JoinGroupRequest, SetMemberRoleRequest, TransferOwnershipRequest,
    UpdateGroupRequest, Validatable,
};
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use std::sync::Arc;
use studyhub_common::{PaginatedResult, PaginationParams};
use studyhub_domain::errors::GroupError;
use studyhub_domain::{Group, GroupId, GroupRole, UserId};
use tracing::{info, instrument, warn};

/// Attempts at drawing an unused invite code before giving up
const INVITE_CODE_ATTEMPTS: usize = 5;

/// Group repository trait
#[async_trait]
pub trait GroupRepositoryPort: Send + Sync {
    /// Fails with `Conflict` if the invite code is taken.
    async fn create(&self, group: &Group) -> ApplicationResult<()>;
    async fn get(&self, id: GroupId) -> ApplicationResult<Option<Group>>;
    /// Invite codes are matched case-insensitively.
    async fn find_by_invite_code(&self, code: &str) -> ApplicationResult<Option<Group>>;
    /// Groups `user_id` belongs to, newest first.
    async fn list_for_member(
        &self,
        user_id: UserId,
        pagination: &PaginationParams,
    ) -> ApplicationResult<PaginatedResult<Group>>;
    async fn list_all_for_member(&self, user_id: UserId) -> ApplicationResult<Vec<Group>>;
    async fn count_owned_by(&self, user_id: UserId) -> ApplicationResult<u64>;
    /// Replaces the stored document; last writer wins.
    async fn update(&self, group: &Group) -> ApplicationResult<()>;
    async fn delete(&self, id: GroupId) -> ApplicationResult<bool>;
}

/// Load a group or fail with 404.
pub(crate) async fn load_group(
    groups: &dyn GroupRepositoryPort,
    id: GroupId,
) -> ApplicationResult<Group> {
    groups
        .get(id)
        .await?
        .ok_or_else(|| GroupError::NotFound(id).into())
}

/// Group service implementation
pub struct GroupService {
    groups: Arc<dyn GroupRepositoryPort>,
    questions: Arc<dyn QuestionRepositoryPort>,
    users: Arc<dyn UserRepositoryPort>,
    event_publisher: Arc<dyn EventPublisher>,
    config: ServiceConfig,
}

impl GroupService {
    pub fn new(
        groups: Arc<dyn GroupRepositoryPort>,
        questions: Arc<dyn QuestionRepositoryPort>,
        users: Arc<dyn UserRepositoryPort>,
        event_publisher: Arc<dyn EventPublisher>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            groups,
            questions,
            users,
            event_publisher,
            config,
        }
    }

    /// Create a group owned by the caller
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_group(
        &self,
        ctx: &ServiceContext,
        request: CreateGroupRequest,
    ) -> ApplicationResult<GroupDto> {
        let user_id = require_account(self.users.as_ref(), ctx).await?.id;
        request.validate_all().ensure_valid()?;

        let invite_code = self.unused_invite_code().await?;
        let group = Group::new(
            request.name.trim(),
            request.description.unwrap_or_default().trim(),
            user_id,
            invite_code,
        );
        self.groups.create(&group).await?;

        info!(group_id = %group.id, owner_id = %user_id, "Group created");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::GroupCreated {
                group_id: group.id,
                owner_id: user_id,
            },
        )
        .await;

        Ok(GroupDto::for_role(&group, Some(GroupRole::Owner)))
    }

    /// Groups the caller belongs to
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_my_groups(
        &self,
        ctx: &ServiceContext,
        pagination: PaginationParams,
    ) -> ApplicationResult<PaginatedResult<GroupDto>> {
        let user_id = ctx.require_authenticated()?;
        let page = self.groups.list_for_member(user_id, &pagination).await?;
        Ok(page.map(|g| GroupDto::for_role(&g, g.role_of(user_id))))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_group(&self, ctx: &ServiceContext, id: GroupId) -> ApplicationResult<GroupDto> {
        ctx.require_authenticated()?;
        let group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;
        Ok(GroupDto::for_role(&group, GroupPolicy::effective_role(ctx, &group)))
    }

    /// Rename or re-describe a group (owner/admin)
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_group(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
        request: UpdateGroupRequest,
    ) -> ApplicationResult<GroupDto> {
        ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let mut group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::can_manage(ctx, &group).ensure_allowed()?;

        if let Some(name) = request.name {
            group.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            group.description = description.trim().to_string();
        }
        group.updated_at = studyhub_common::now_utc();
        self.groups.update(&group).await?;

        info!(group_id = %id, "Group updated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::GroupUpdated { group_id: id },
        )
        .await;

        Ok(GroupDto::for_role(&group, GroupPolicy::effective_role(ctx, &group)))
    }

    /// Delete a group and every question posted to it (owner only)
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_group(&self, ctx: &ServiceContext, id: GroupId) -> ApplicationResult<()> {
        ctx.require_authenticated()?;
        let group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::is_owner(ctx, &group).ensure_allowed()?;

        let questions_deleted = self.questions.delete_by_group(id).await?;
        self.groups.delete(id).await?;

        info!(group_id = %id, questions_deleted, "Group deleted");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::GroupDeleted {
                group_id: id,
                questions_deleted,
            },
        )
        .await;

        Ok(())
    }

    /// Join the group an invite code belongs to
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn join_group(
        &self,
        ctx: &ServiceContext,
        request: JoinGroupRequest,
    ) -> ApplicationResult<GroupDto> {
        let user_id = require_account(self.users.as_ref(), ctx).await?.id;
        request.validate_all().ensure_valid()?;

        let mut group = self
            .groups
            .find_by_invite_code(&request.invite_code.trim().to_uppercase())
            .await?
            .ok_or(GroupError::InviteCodeNotFound)?;

        group.add_member(user_id, GroupRole::Member, self.config.max_members)?;
        self.groups.update(&group).await?;

        info!(group_id = %group.id, user_id = %user_id, "Member joined");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::MemberJoined {
                group_id: group.id,
                user_id,
            },
        )
        .await;

        Ok(GroupDto::for_role(&group, Some(GroupRole::Member)))
    }

    /// Leave a group. The owner has to transfer ownership first.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn leave_group(&self, ctx: &ServiceContext, id: GroupId) -> ApplicationResult<()> {
        let user_id = ctx.require_authenticated()?;
        let mut group = load_group(self.groups.as_ref(), id).await?;

        group.remove_member(user_id)?;
        self.groups.update(&group).await?;

        info!(group_id = %id, user_id = %user_id, "Member left");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::MemberLeft {
                group_id: id,
                user_id,
            },
        )
        .await;

        Ok(())
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_members(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
    ) -> ApplicationResult<Vec<MemberDto>> {
        ctx.require_authenticated()?;
        let group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::can_view(ctx, &group).ensure_allowed()?;

        let users = user_summaries(self.users.as_ref(), &group.member_ids()).await?;
        Ok(MemberDto::list(&group, &users))
    }

    /// Remove another member (owner/admin).
    ///
    /// Admins can only remove plain members. Nobody can remove the owner,
    /// and members leave through `leave_group` rather than removing
    /// themselves.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn remove_member(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
        user_id: UserId,
    ) -> ApplicationResult<()> {
        let caller = ctx.require_authenticated()?;
        let mut group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::can_manage(ctx, &group).ensure_allowed()?;

        if caller == user_id {
            return Err(GroupError::CannotRemoveSelf.into());
        }

        let target_role = group.role_of(user_id).ok_or_else(|| {
            ApplicationError::NotFound("User is not a member of this group".to_string())
        })?;
        let caller_role = GroupPolicy::effective_role(ctx, &group);

        match target_role {
            GroupRole::Owner => return Err(GroupError::OwnerCannotLeave.into()),
            GroupRole::Admin if caller_role != Some(GroupRole::Owner) => {
                return Err(ApplicationError::Forbidden(
                    "Only the group owner can remove an admin".to_string(),
                ))
            }
            _ => {}
        }

        group.remove_member(user_id)?;
        self.groups.update(&group).await?;

        info!(group_id = %id, user_id = %user_id, removed_by = %caller, "Member removed");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::MemberRemoved {
                group_id: id,
                user_id,
            },
        )
        .await;

        Ok(())
    }

    /// Promote or demote a member (owner only)
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn set_member_role(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
        user_id: UserId,
        request: SetMemberRoleRequest,
    ) -> ApplicationResult<MemberDto> {
        ctx.require_authenticated()?;
        request.validate_all().ensure_valid()?;

        let mut group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::is_owner(ctx, &group).ensure_allowed()?;

        if !group.is_member(user_id) {
            return Err(ApplicationError::NotFound(
                "User is not a member of this group".to_string(),
            ));
        }
        group.set_role(user_id, request.role)?;
        self.groups.update(&group).await?;

        info!(group_id = %id, user_id = %user_id, role = %request.role, "Member role changed");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::MemberRoleChanged {
                group_id: id,
                user_id,
                role: request.role,
            },
        )
        .await;

        self.member_view(&group, user_id).await
    }

    /// Hand ownership to another member (owner only)
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn transfer_ownership(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
        request: TransferOwnershipRequest,
    ) -> ApplicationResult<GroupDto> {
        ctx.require_authenticated()?;

        let mut group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::is_owner(ctx, &group).ensure_allowed()?;

        let from = group.owner_id;
        group
            .transfer_ownership(request.user_id)
            .map_err(|e| match e {
                GroupError::NotMember => ApplicationError::NotFound(
                    "User is not a member of this group".to_string(),
                ),
                other => other.into(),
            })?;
        self.groups.update(&group).await?;

        info!(group_id = %id, from = %from, to = %request.user_id, "Ownership transferred");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::OwnershipTransferred {
                group_id: id,
                from,
                to: request.user_id,
            },
        )
        .await;

        Ok(GroupDto::for_role(&group, GroupPolicy::effective_role(ctx, &group)))
    }

    /// Issue a fresh invite code; the old one stops working (owner/admin)
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn regenerate_invite_code(
        &self,
        ctx: &ServiceContext,
        id: GroupId,
    ) -> ApplicationResult<InviteCodeDto> {
        ctx.require_authenticated()?;
        let mut group = load_group(self.groups.as_ref(), id).await?;
        GroupPolicy::can_manage(ctx, &group).ensure_allowed()?;

        group.invite_code = self.unused_invite_code().await?;
        group.updated_at = studyhub_common::now_utc();
        self.groups.update(&group).await?;

        info!(group_id = %id, "Invite code regenerated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::InviteCodeRegenerated { group_id: id },
        )
        .await;

        Ok(InviteCodeDto {
            invite_code: group.invite_code,
        })
    }

    async fn unused_invite_code(&self) -> ApplicationResult<String> {
        for _ in 0..INVITE_CODE_ATTEMPTS {
            let code = studyhub_common::generate_invite_code();
            if self.groups.find_by_invite_code(&code).await?.is_none() {
                return Ok(code);
            }
            warn!("Invite code collision, retrying");
        }
        Err(ApplicationError::Internal(
            "Could not allocate an invite code".to_string(),
        ))
    }

    async fn member_view(&self, group: &Group, user_id: UserId) -> ApplicationResult<MemberDto> {
        let member = group
            .member(user_id)
            .ok_or_else(|| ApplicationError::NotFound("Member not found".to_string()))?;
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("User not found: {}", user_id)))?;
        Ok(MemberDto::new(member, user.summary()))
    }
}
