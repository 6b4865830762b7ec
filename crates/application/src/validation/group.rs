//! Group request validation

use super::{Validatable, ValidationResult, ValidationRules, ValidatorExt};
use serde::{Deserialize, Serialize};
use studyhub_domain::{GroupRole, UserId};
use validator::Validate;

pub const MAX_GROUP_NAME_LENGTH: usize = 100;
pub const MAX_GROUP_DESCRIPTION_LENGTH: usize = 1000;

/// Create a study group
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Description must be 1000 characters or less"))]
    pub description: Option<String>,
}

impl Validatable for CreateGroupRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        if !self.name.is_empty() {
            result.merge(ValidationRules::validate_not_blank(&self.name, "name"));
        }
        result
    }
}

/// Edit a group's name or description
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 1000, message = "Description must be 1000 characters or less"))]
    pub description: Option<String>,
}

impl Validatable for UpdateGroupRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            result.merge(ValidationRules::validate_not_blank(name, "name"));
        }
        if self.name.is_none() && self.description.is_none() {
            result.add_object_error("Nothing to update");
        }
        result
    }
}

/// Join a group by invite code
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct JoinGroupRequest {
    #[validate(length(min = 1, message = "Invite code is required"))]
    pub invite_code: String,
}

impl Validatable for JoinGroupRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        if !self.invite_code.is_empty()
            && !studyhub_common::crypto::is_valid_invite_code(self.invite_code.trim())
        {
            result.add_field_error("invite_code", "Invite code is malformed");
        }
        result
    }
}

/// Change a member's role
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetMemberRoleRequest {
    pub role: GroupRole,
}

impl Validatable for SetMemberRoleRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = ValidationResult::success();
        if self.role == GroupRole::Owner {
            result.add_field_error("role", "Use ownership transfer to assign a new owner");
        }
        result
    }
}

/// Hand group ownership to another member
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferOwnershipRequest {
    pub user_id: UserId,
}

impl Validatable for TransferOwnershipRequest {
    fn validate_all(&self) -> ValidationResult {
        ValidationResult::success()
    }
}
