//! Application Services
//!
//! Business logic orchestration layer that coordinates domain operations,
//! repository access, and cross-cutting concerns.

mod group;
mod question;
mod stats;
mod user;

pub use group::*;
pub use question::*;
pub use stats::*;
pub use user::*;

pub(crate) use group::load_group;
pub(crate) use user::{require_account, user_summaries};

use crate::stats::StatsConfig;
use crate::ApplicationError;
use async_trait::async_trait;
use serde::Serialize;
use studyhub_domain::errors::AuthorizationError;
use studyhub_domain::events::{DomainEvent, EventMetadata};
use studyhub_domain::{FeedbackId, Group, GroupId, GroupRole, QuestionId, UserId};

/// Service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum members per group
    pub max_members: usize,
    /// Statistics windows
    pub stats: StatsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_members: 50,
            stats: StatsConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_app_config(config: &studyhub_common::AppConfig) -> Self {
        Self {
            max_members: config.groups.max_members,
            stats: StatsConfig {
                rolling_window_days: config.stats.rolling_window_days,
                activity_days: config.stats.activity_days,
            },
        }
    }
}

/// Service context for request handling
#[derive(Debug, Clone)]
pub struct ServiceContext {
    /// The authenticated user ID (if any)
    pub user_id: Option<UserId>,
    /// Request correlation ID for tracing
    pub correlation_id: String,
    /// Whether the user has platform admin privileges
    pub is_admin: bool,
}

impl ServiceContext {
    pub fn anonymous(correlation_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            correlation_id: correlation_id.into(),
            is_admin: false,
        }
    }

    pub fn authenticated(user_id: UserId, correlation_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            correlation_id: correlation_id.into(),
            is_admin: false,
        }
    }

    pub fn with_admin(mut self) -> Self {
        self.is_admin = true;
        self
    }

    pub fn require_authenticated(&self) -> Result<UserId, ApplicationError> {
        self.user_id
            .ok_or_else(|| AuthorizationError::AuthenticationRequired.into())
    }

    pub fn require_admin(&self) -> Result<(), ApplicationError> {
        if !self.is_admin {
            return Err(ApplicationError::Forbidden(
                "Admin privileges required".to_string(),
            ));
        }
        Ok(())
    }

    fn metadata(&self) -> EventMetadata {
        EventMetadata {
            correlation_id: Some(self.correlation_id.clone()),
            actor_id: self.user_id,
        }
    }
}

/// Service event for audit logging
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceEvent {
    // User events
    UserRegistered { user_id: UserId },
    UserUpdated { user_id: UserId },
    UserPasswordChanged { user_id: UserId },
    UserDeleted { user_id: UserId },

    // Group events
    GroupCreated { group_id: GroupId, owner_id: UserId },
    GroupUpdated { group_id: GroupId },
    GroupDeleted { group_id: GroupId, questions_deleted: u64 },
    MemberJoined { group_id: GroupId, user_id: UserId },
    MemberLeft { group_id: GroupId, user_id: UserId },
    MemberRemoved { group_id: GroupId, user_id: UserId },
    MemberRoleChanged { group_id: GroupId, user_id: UserId, role: GroupRole },
    OwnershipTransferred { group_id: GroupId, from: UserId, to: UserId },
    InviteCodeRegenerated { group_id: GroupId },

    // Question events
    QuestionCreated { question_id: QuestionId, group_id: GroupId },
    QuestionUpdated { question_id: QuestionId },
    QuestionDeleted { question_id: QuestionId, group_id: GroupId },
    ResponseRecorded { question_id: QuestionId, user_id: UserId, solved: bool },
    ResponseDeleted { question_id: QuestionId, user_id: UserId },
    DifficultyRated { question_id: QuestionId, user_id: UserId, rating: u8 },
    FeedbackAdded { question_id: QuestionId, feedback_id: FeedbackId },
    FeedbackUpdated { question_id: QuestionId, feedback_id: FeedbackId },
    FeedbackDeleted { question_id: QuestionId, feedback_id: FeedbackId },
}

impl ServiceEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::UserUpdated { .. } => "user_updated",
            Self::UserPasswordChanged { .. } => "user_password_changed",
            Self::UserDeleted { .. } => "user_deleted",
            Self::GroupCreated { .. } => "group_created",
            Self::GroupUpdated { .. } => "group_updated",
            Self::GroupDeleted { .. } => "group_deleted",
            Self::MemberJoined { .. } => "member_joined",
            Self::MemberLeft { .. } => "member_left",
            Self::MemberRemoved { .. } => "member_removed",
            Self::MemberRoleChanged { .. } => "member_role_changed",
            Self::OwnershipTransferred { .. } => "ownership_transferred",
            Self::InviteCodeRegenerated { .. } => "invite_code_regenerated",
            Self::QuestionCreated { .. } => "question_created",
            Self::QuestionUpdated { .. } => "question_updated",
            Self::QuestionDeleted { .. } => "question_deleted",
            Self::ResponseRecorded { .. } => "response_recorded",
            Self::ResponseDeleted { .. } => "response_deleted",
            Self::DifficultyRated { .. } => "difficulty_rated",
            Self::FeedbackAdded { .. } => "feedback_added",
            Self::FeedbackUpdated { .. } => "feedback_updated",
            Self::FeedbackDeleted { .. } => "feedback_deleted",
        }
    }

    /// Aggregate the event belongs to, as `(type, id)`.
    pub fn aggregate(&self) -> (&'static str, String) {
        match self {
            Self::UserRegistered { user_id }
            | Self::UserUpdated { user_id }
            | Self::UserPasswordChanged { user_id }
            | Self::UserDeleted { user_id } => ("user", user_id.to_string()),
            Self::GroupCreated { group_id, .. }
            | Self::GroupUpdated { group_id }
            | Self::GroupDeleted { group_id, .. }
            | Self::MemberJoined { group_id, .. }
            | Self::MemberLeft { group_id, .. }
            | Self::MemberRemoved { group_id, .. }
            | Self::MemberRoleChanged { group_id, .. }
            | Self::OwnershipTransferred { group_id, .. }
            | Self::InviteCodeRegenerated { group_id } => ("group", group_id.to_string()),
            Self::QuestionCreated { question_id, .. }
            | Self::QuestionUpdated { question_id }
            | Self::QuestionDeleted { question_id, .. }
            | Self::ResponseRecorded { question_id, .. }
            | Self::ResponseDeleted { question_id, .. }
            | Self::DifficultyRated { question_id, .. }
            | Self::FeedbackAdded { question_id, .. }
            | Self::FeedbackUpdated { question_id, .. }
            | Self::FeedbackDeleted { question_id, .. } => ("question", question_id.to_string()),
        }
    }

    /// Wrap the event in a domain event envelope.
    pub fn into_domain_event(self, metadata: EventMetadata) -> DomainEvent {
        let (aggregate_type, aggregate_id) = self.aggregate();
        let event_type = self.event_type();
        let payload = serde_json::to_value(&self).unwrap_or(serde_json::Value::Null);
        DomainEvent::new(event_type, aggregate_type, aggregate_id, payload, metadata)
    }
}

/// Event publisher trait for service events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> Result<(), ApplicationError>;
}

/// No-op event publisher for testing
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: DomainEvent) -> Result<(), ApplicationError> {
        Ok(())
    }
}

/// Writes every event as a structured audit log line
pub struct TracingEventPublisher;

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), ApplicationError> {
        tracing::info!(
            target: "studyhub::audit",
            event_id = %event.id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or(""),
            actor_id = ?event.metadata.actor_id,
            payload = %event.payload,
            "domain event"
        );
        Ok(())
    }
}

/// Publish a service event. Publishing failures are logged and swallowed so
/// they never fail the request that produced the event.
pub(crate) async fn emit(publisher: &dyn EventPublisher, ctx: &ServiceContext, event: ServiceEvent) {
    let event = event.into_domain_event(ctx.metadata());
    if let Err(e) = publisher.publish(event).await {
        tracing::warn!(error = %e, "failed to publish event");
    }
}

/// Authorization result
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthorizationResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    pub fn ensure_allowed(&self) -> Result<(), ApplicationError> {
        if self.allowed {
            Ok(())
        } else {
            Err(ApplicationError::Forbidden(
                self.reason
                    .clone()
                    .unwrap_or_else(|| "Access denied".to_string()),
            ))
        }
    }
}

/// Group-level authorization checks. Platform admins pass all of them.
pub struct GroupPolicy;

impl GroupPolicy {
    /// The caller's effective role in `group`.
    pub fn effective_role(ctx: &ServiceContext, group: &Group) -> Option<GroupRole> {
        if ctx.is_admin {
            return Some(GroupRole::Owner);
        }
        ctx.user_id.and_then(|id| group.role_of(id))
    }

    pub fn can_view(ctx: &ServiceContext, group: &Group) -> AuthorizationResult {
        match Self::effective_role(ctx, group) {
            Some(_) => AuthorizationResult::allow(),
            None => AuthorizationResult::deny("You are not a member of this group"),
        }
    }

    pub fn can_manage(ctx: &ServiceContext, group: &Group) -> AuthorizationResult {
        match Self::effective_role(ctx, group) {
            Some(role) if role.can_manage() => AuthorizationResult::allow(),
            Some(_) => AuthorizationResult::deny("Group owner or admin role required"),
            None => AuthorizationResult::deny("You are not a member of this group"),
        }
    }

    pub fn is_owner(ctx: &ServiceContext, group: &Group) -> AuthorizationResult {
        match Self::effective_role(ctx, group) {
            Some(GroupRole::Owner) => AuthorizationResult::allow(),
            Some(_) => AuthorizationResult::deny("Only the group owner can do this"),
            None => AuthorizationResult::deny("You are not a member of this group"),
        }
    }
}
