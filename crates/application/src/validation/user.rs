//! Account request validation

use super::{Validatable, ValidationResult, ValidatorExt};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub username: String,
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
    pub password: String,
}

impl Validatable for RegisterRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();

        result.check("username", studyhub_common::validate_username(&self.username));
        result.check("password", studyhub_common::validate_password(&self.password));

        if self.display_name.trim().is_empty() && !self.display_name.is_empty() {
            result.add_field_error("display_name", "Display name must not be blank");
        }

        result
    }
}

/// Log in with email and password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Validatable for LoginRequest {
    fn validate_all(&self) -> ValidationResult {
        self.to_validation_result()
    }
}

/// Update the caller's profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: Option<String>,
}

impl Validatable for UpdateProfileRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        if matches!(&self.display_name, Some(name) if name.trim().is_empty()) {
            result.add_field_error("display_name", "Display name must not be blank");
        }
        result
    }
}

/// Change the caller's password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    pub new_password: String,
}

impl Validatable for ChangePasswordRequest {
    fn validate_all(&self) -> ValidationResult {
        let mut result = self.to_validation_result();
        result.check("new_password", studyhub_common::validate_password(&self.new_password));

        if self.current_password == self.new_password {
            result.add_field_error("new_password", "New password must differ from the current one");
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register() -> RegisterRequest {
        RegisterRequest {
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            display_name: "Ada".to_string(),
            password: "analytical1".to_string(),
        }
    }

    #[test]
    fn test_register_valid() {
        assert!(register().validate_all().valid);
    }

    #[test]
    fn test_register_rejects_each_field() {
        let mut req = register();
        req.email = "not-an-email".to_string();
        assert!(req.validate_all().field_errors.contains_key("email"));

        let mut req = register();
        req.username = "1ada".to_string();
        assert!(req.validate_all().field_errors.contains_key("username"));

        let mut req = register();
        req.password = "nodigitshere".to_string();
        assert!(req.validate_all().field_errors.contains_key("password"));

        let mut req = register();
        req.display_name = String::new();
        assert!(req.validate_all().field_errors.contains_key("display_name"));

        let mut req = register();
        req.display_name = "   ".to_string();
        assert!(req.validate_all().field_errors.contains_key("display_name"));
    }

    #[test]
    fn test_change_password_requires_new_value() {
        let req = ChangePasswordRequest {
            current_password: "secret123".to_string(),
            new_password: "secret123".to_string(),
        };
        assert!(!req.validate_all().valid);
    }

    #[test]
    fn test_update_profile_optional() {
        assert!(UpdateProfileRequest::default().validate_all().valid);

        let req = UpdateProfileRequest {
            display_name: Some("x".repeat(101)),
        };
        assert!(!req.validate_all().valid);
    }
}
