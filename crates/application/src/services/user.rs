//! User Service
//!
//! Business logic for accounts: registration, login, profile management
//! and account deletion. Token issuance lives in the HTTP layer; this
//! service only establishes who the caller is.

use super::{emit, EventPublisher, GroupRepositoryPort, ServiceContext, ServiceEvent};
use crate::dto::{PublicUserDto, UserDto};
use crate::validation::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, Validatable,
};
use crate::{ApplicationError, ApplicationResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use studyhub_domain::errors::{AuthorizationError, GroupError};
use studyhub_domain::{User, UserId, UserSummary};
use tracing::{debug, info, instrument, warn};

/// User repository trait
///
/// Email lookups are exact on the stored (lowercased) address; username
/// lookups are case-insensitive. `create` and `update` fail with
/// `Conflict` when either would collide with another account.
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    async fn create(&self, user: &User) -> ApplicationResult<()>;
    async fn get(&self, id: UserId) -> ApplicationResult<Option<User>>;
    async fn get_many(&self, ids: &[UserId]) -> ApplicationResult<Vec<User>>;
    async fn find_by_email(&self, email: &str) -> ApplicationResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> ApplicationResult<Option<User>>;
    async fn update(&self, user: &User) -> ApplicationResult<()>;
    async fn delete(&self, id: UserId) -> ApplicationResult<bool>;
}

/// Password hasher trait
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> ApplicationResult<String>;
    async fn verify(&self, password: &str, hash: &str) -> ApplicationResult<bool>;
}

/// Argon2id hasher. Hashing is CPU-bound, so it runs on the blocking pool.
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || studyhub_common::hash_password(&password))
            .await
            .map_err(|e| ApplicationError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ApplicationError::Internal(e.to_string()))
    }

    async fn verify(&self, password: &str, hash: &str) -> ApplicationResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || studyhub_common::verify_password(&password, &hash))
            .await
            .map_err(|e| ApplicationError::Internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ApplicationError::Internal(e.to_string()))
    }
}

/// Load user summaries for `ids`, keyed by id. Unknown ids are absent.
pub(crate) async fn user_summaries(
    users: &dyn UserRepositoryPort,
    ids: &[UserId],
) -> ApplicationResult<HashMap<UserId, UserSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(users
        .get_many(ids)
        .await?
        .iter()
        .map(|u| (u.id, u.summary()))
        .collect())
}

/// The caller's account. A token can outlive the account it was issued
/// for, so a missing record is `Unauthorized`.
pub(crate) async fn require_account(
    users: &dyn UserRepositoryPort,
    ctx: &ServiceContext,
) -> ApplicationResult<User> {
    let user_id = ctx.require_authenticated()?;
    users
        .get(user_id)
        .await?
        .ok_or_else(|| ApplicationError::Unauthorized("Account no longer exists".to_string()))
}

/// User service implementation
pub struct UserService {
    users: Arc<dyn UserRepositoryPort>,
    groups: Arc<dyn GroupRepositoryPort>,
    password_hasher: Arc<dyn PasswordHasher>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepositoryPort>,
        groups: Arc<dyn GroupRepositoryPort>,
        password_hasher: Arc<dyn PasswordHasher>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            users,
            groups,
            password_hasher,
            event_publisher,
        }
    }

    /// Register a new account
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id, username = %request.username))]
    pub async fn register(
        &self,
        ctx: &ServiceContext,
        request: RegisterRequest,
    ) -> ApplicationResult<UserDto> {
        request.validate_all().ensure_valid()?;

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApplicationError::Conflict(
                "Email already registered".to_string(),
            ));
        }
        if self.users.find_by_username(&request.username).await?.is_some() {
            return Err(ApplicationError::Conflict(
                "Username already taken".to_string(),
            ));
        }

        let password_hash = self.password_hasher.hash(&request.password).await?;
        let user = User::new(
            email,
            request.username,
            request.display_name.trim(),
            password_hash,
        );
        self.users.create(&user).await?;

        info!(user_id = %user.id, "User registered");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::UserRegistered { user_id: user.id },
        )
        .await;

        Ok(UserDto::from(&user))
    }

    /// Check credentials and record the login
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn login(
        &self,
        ctx: &ServiceContext,
        request: LoginRequest,
    ) -> ApplicationResult<UserDto> {
        request.validate_all().ensure_valid()?;

        let email = request.email.trim().to_lowercase();
        let Some(mut user) = self.users.find_by_email(&email).await? else {
            debug!("Login for unknown email");
            return Err(AuthorizationError::InvalidCredentials.into());
        };

        if !self
            .password_hasher
            .verify(&request.password, &user.password_hash)
            .await?
        {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthorizationError::InvalidCredentials.into());
        }

        let now = studyhub_common::now_utc();
        user.last_login_at = Some(now);
        self.users.update(&user).await?;

        debug!(user_id = %user.id, "User authenticated");
        Ok(UserDto::from(&user))
    }

    /// The caller's own account
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn me(&self, ctx: &ServiceContext) -> ApplicationResult<UserDto> {
        let user = self.current_user(ctx).await?;
        Ok(UserDto::from(&user))
    }

    /// Another user's public profile
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn get_user(
        &self,
        ctx: &ServiceContext,
        id: UserId,
    ) -> ApplicationResult<PublicUserDto> {
        ctx.require_authenticated()?;
        self.users
            .get(id)
            .await?
            .map(|u| PublicUserDto::from(&u))
            .ok_or_else(|| ApplicationError::NotFound(format!("User not found: {}", id)))
    }

    /// Update the caller's profile
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn update_profile(
        &self,
        ctx: &ServiceContext,
        request: UpdateProfileRequest,
    ) -> ApplicationResult<UserDto> {
        request.validate_all().ensure_valid()?;

        let mut user = self.current_user(ctx).await?;
        if let Some(display_name) = request.display_name {
            user.display_name = display_name.trim().to_string();
        }
        user.updated_at = studyhub_common::now_utc();
        self.users.update(&user).await?;

        info!(user_id = %user.id, "User updated");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::UserUpdated { user_id: user.id },
        )
        .await;

        Ok(UserDto::from(&user))
    }

    /// Change the caller's password after checking the current one
    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn change_password(
        &self,
        ctx: &ServiceContext,
        request: ChangePasswordRequest,
    ) -> ApplicationResult<()> {
        request.validate_all().ensure_valid()?;

        let mut user = self.current_user(ctx).await?;
        if !self
            .password_hasher
            .verify(&request.current_password, &user.password_hash)
            .await?
        {
            return Err(ApplicationError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        user.password_hash = self.password_hasher.hash(&request.new_password).await?;
        user.updated_at = studyhub_common::now_utc();
        self.users.update(&user).await?;

        info!(user_id = %user.id, "User password changed");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::UserPasswordChanged { user_id: user.id },
        )
        .await;

        Ok(())
    }

    /// Delete the caller's account and drop them from every group.
    ///
    /// Refused while the caller owns a group; ownership has to be handed
    /// over or the group deleted first.
    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn delete_account(&self, ctx: &ServiceContext) -> ApplicationResult<()> {
        let user = self.current_user(ctx).await?;

        let owned = self.groups.count_owned_by(user.id).await?;
        if owned > 0 {
            return Err(GroupError::OwnsGroups(owned as usize).into());
        }

        for mut group in self.groups.list_all_for_member(user.id).await? {
            group.remove_member(user.id)?;
            self.groups.update(&group).await?;
        }

        self.users.delete(user.id).await?;

        info!(user_id = %user.id, "User deleted");
        emit(
            self.event_publisher.as_ref(),
            ctx,
            ServiceEvent::UserDeleted { user_id: user.id },
        )
        .await;

        Ok(())
    }

    async fn current_user(&self, ctx: &ServiceContext) -> ApplicationResult<User> {
        require_account(self.users.as_ref(), ctx).await
    }
}
