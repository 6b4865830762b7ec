//! Authentication extractor.

use crate::{auth::Claims, error::ApiError, middleware::RequestId, state::AppState};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::convert::Infallible;
use studyhub_application::ServiceContext;
use studyhub_domain::{UserId, UserRole};
use uuid::Uuid;

fn request_id(parts: &Parts) -> String {
    parts
        .extensions
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Authenticated user information extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID
    pub user_id: UserId,

    /// Platform role
    pub role: UserRole,

    /// Original claims
    pub claims: Claims,

    /// Request ID, used as the service correlation ID
    pub request_id: String,
}

impl AuthenticatedUser {
    /// Check if user is a platform admin
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Service context for this caller
    pub fn ctx(&self) -> ServiceContext {
        let ctx = ServiceContext::authenticated(self.user_id, self.request_id.clone());
        if self.is_admin() {
            ctx.with_admin()
        } else {
            ctx
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidToken("Invalid authorization header format".to_string())
            })?;

        let claims = state.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        Ok(Self {
            user_id,
            role: claims.role,
            claims,
            request_id: request_id(parts),
        })
    }
}

/// Context for routes that do not require authentication
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID, used as the service correlation ID
    pub request_id: String,
}

impl RequestContext {
    /// Anonymous service context
    pub fn ctx(&self) -> ServiceContext {
        ServiceContext::anonymous(self.request_id.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            request_id: request_id(parts),
        })
    }
}
