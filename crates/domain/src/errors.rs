//! Error types for the StudyHub domain.
//!
//! Each aggregate has its own error enum; `AppError` unifies them and
//! carries the HTTP status and machine-readable code used in API responses.

use crate::identifiers::*;

/// Top-level domain error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Group and membership errors
    #[error("Group error: {0}")]
    Group(#[from] GroupError),

    /// Question, response, rating and feedback errors
    #[error("Question error: {0}")]
    Question(#[from] QuestionError),

    /// Authentication errors
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),
}

impl AppError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Group(e) => e.error_code(),
            Self::Question(e) => e.error_code(),
            Self::Authorization(_) => "UNAUTHORIZED",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Group(e) => e.http_status(),
            Self::Question(e) => e.http_status(),
            Self::Authorization(_) => 401,
        }
    }
}

/// Group-specific errors
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    #[error("Group not found: {0}")]
    NotFound(GroupId),

    #[error("No group matches invite code")]
    InviteCodeNotFound,

    #[error("User is already a member of this group")]
    AlreadyMember,

    #[error("User is not a member of this group")]
    NotMember,

    #[error("Group is full ({max} members)")]
    GroupFull { max: usize },

    #[error("The group owner cannot leave or be removed; transfer ownership first")]
    OwnerCannotLeave,

    #[error("Members cannot remove themselves; leave the group instead")]
    CannotRemoveSelf,

    #[error("Invalid role change: {0}")]
    InvalidRoleChange(String),

    #[error("User still owns {0} group(s)")]
    OwnsGroups(usize),
}

impl GroupError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::InviteCodeNotFound => "NOT_FOUND",
            Self::NotMember | Self::OwnerCannotLeave => "FORBIDDEN",
            Self::AlreadyMember
            | Self::GroupFull { .. }
            | Self::OwnsGroups(_)
            | Self::CannotRemoveSelf
            | Self::InvalidRoleChange(_) => "CONFLICT",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self.error_code() {
            "NOT_FOUND" => 404,
            "FORBIDDEN" => 403,
            _ => 409,
        }
    }
}

/// Question-specific errors
#[derive(Debug, thiserror::Error)]
pub enum QuestionError {
    #[error("Question not found: {0}")]
    NotFound(QuestionId),

    #[error("No response recorded for this user")]
    ResponseNotFound,

    #[error("Feedback not found: {0}")]
    FeedbackNotFound(FeedbackId),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

impl QuestionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::ResponseNotFound | Self::FeedbackNotFound(_) => "NOT_FOUND",
            Self::InvalidRating(_) => "VALIDATION_ERROR",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRating(_) => 422,
            _ => 404,
        }
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    /// No authenticated caller
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::Group(GroupError::NotFound(GroupId::new()));
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(err.http_status(), 404);

        let err = AppError::Group(GroupError::GroupFull { max: 50 });
        assert_eq!(err.http_status(), 409);

        let err = AppError::Authorization(AuthorizationError::AuthenticationRequired);
        assert_eq!(err.error_code(), "UNAUTHORIZED");
        assert_eq!(err.http_status(), 401);

        let err = AppError::Group(GroupError::NotMember);
        assert_eq!(err.http_status(), 403);

        let err = AppError::Question(QuestionError::InvalidRating(9));
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn test_rule_violations_are_conflicts() {
        for err in [
            GroupError::CannotRemoveSelf,
            GroupError::InvalidRoleChange("the owner's role cannot be changed".to_string()),
        ] {
            assert_eq!(err.error_code(), "CONFLICT");
            assert_eq!(err.http_status(), 409);
        }
    }
}
