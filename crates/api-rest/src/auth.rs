//! Access tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and platform role. They are
//! issued on register and login and checked by the
//! [`AuthenticatedUser`](crate::extractors::AuthenticatedUser) extractor.

use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use studyhub_domain::{UserId, UserRole};
use uuid::Uuid;

const MAX_EXPIRY_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Claims stored in an access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Platform role at the time of issue
    pub role: UserRole,

    /// Issued at (as UTC timestamp)
    pub iat: i64,

    /// Expiration time (as UTC timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get user ID from claims
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from)
            .map_err(|_| ApiError::InvalidToken("Invalid user ID in token".to_string()))
    }
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Encoded JWT
    pub token: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens with a shared HMAC secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenService {
    /// Create a token service for `secret`, issuing tokens valid for
    /// `expiry_seconds`.
    pub fn new(secret: &str, expiry_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::seconds(expiry_seconds.min(MAX_EXPIRY_SECONDS) as i64),
        }
    }

    /// Issue a token for `user_id`
    pub fn issue(&self, user_id: UserId, role: UserRole) -> Result<IssuedToken, ApiError> {
        self.issue_at(user_id, role, Utc::now())
    }

    fn issue_at(
        &self,
        user_id: UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, ApiError> {
        let expires_at = now + self.expiry;
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Decode and validate a token, including its expiry
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| ApiError::InvalidToken(format!("Token validation failed: {}", e)))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
