//! Validation Framework
//!
//! Request types for every use case, and the rules they are checked
//! against. Simple bounds are declared with `validator` derives; rules that
//! need more than a bound (username shape, password strength, tag lists)
//! are added in each type's `Validatable` impl.

mod group;
mod question;
mod user;

pub use group::*;
pub use question::*;
pub use user::*;

use crate::ApplicationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Validation result containing all errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed
    pub valid: bool,
    /// Field-level errors
    pub field_errors: BTreeMap<String, Vec<String>>,
    /// Object-level errors
    pub object_errors: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            valid: true,
            field_errors: BTreeMap::new(),
            object_errors: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            field_errors: BTreeMap::new(),
            object_errors: vec![message.into()],
        }
    }

    /// Add a field-level error
    pub fn add_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.field_errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Add an object-level error
    pub fn add_object_error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.object_errors.push(message.into());
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }

        for (field, errors) in other.field_errors {
            self.field_errors.entry(field).or_default().extend(errors);
        }

        self.object_errors.extend(other.object_errors);
    }

    /// Record `check`'s error message against `field`, if any.
    pub fn check(&mut self, field: &str, check: Result<(), String>) {
        if let Err(message) = check {
            self.add_field_error(field, message);
        }
    }

    /// Convert to ApplicationError if invalid
    pub fn to_error(&self) -> Option<ApplicationError> {
        if self.valid {
            return None;
        }

        let mut messages = Vec::new();

        for (field, errors) in &self.field_errors {
            for error in errors {
                messages.push(format!("{}: {}", field, error));
            }
        }

        messages.extend(self.object_errors.clone());

        Some(ApplicationError::ValidationFailed(messages.join("; ")))
    }

    /// Ensure validation passed, returning error if not
    pub fn ensure_valid(&self) -> Result<(), ApplicationError> {
        match self.to_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Trait for validatable types
pub trait Validatable {
    /// Validate the type and return a result
    fn validate_all(&self) -> ValidationResult;
}

/// Extension to convert validator errors to our format
pub trait ValidatorExt {
    fn to_validation_result(&self) -> ValidationResult;
}

impl<T: Validate> ValidatorExt for T {
    fn to_validation_result(&self) -> ValidationResult {
        match self.validate() {
            Ok(_) => ValidationResult::success(),
            Err(errors) => {
                let mut result = ValidationResult::success();

                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let message = error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string());
                        result.add_field_error(field.to_string(), message);
                    }
                }

                result
            }
        }
    }
}

/// Common validation rules
pub struct ValidationRules;

impl ValidationRules {
    /// Validate a string length in characters
    pub fn validate_length(
        value: &str,
        field: &str,
        min: Option<usize>,
        max: Option<usize>,
    ) -> ValidationResult {
        let mut result = ValidationResult::success();
        let len = value.chars().count();

        if let Some(min_len) = min {
            if len < min_len {
                result.add_field_error(field, format!("Must be at least {} characters", min_len));
            }
        }

        if let Some(max_len) = max {
            if len > max_len {
                result.add_field_error(field, format!("Must be {} characters or less", max_len));
            }
        }

        result
    }

    /// Validate a non-blank string, ignoring surrounding whitespace
    pub fn validate_not_blank(value: &str, field: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        if value.trim().is_empty() {
            result.add_field_error(field, "Must not be blank");
        }
        result
    }

    /// Validate a list size
    pub fn validate_list_size<T>(list: &[T], field: &str, max: usize) -> ValidationResult {
        let mut result = ValidationResult::success();
        if list.len() > max {
            result.add_field_error(field, format!("Must have {} items or less", max));
        }
        result
    }

    /// Validate an http(s) URL
    pub fn validate_url(url: &str, field: &str) -> ValidationResult {
        let mut result = ValidationResult::success();
        result.check(field, studyhub_common::validate_url(url));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_result_success() {
        let result = ValidationResult::success();
        assert!(result.valid);
        assert!(result.to_error().is_none());
    }

    #[test]
    fn test_validation_result_error() {
        let result = ValidationResult::error("Test error");
        assert!(!result.valid);
        assert!(matches!(
            result.to_error(),
            Some(ApplicationError::ValidationFailed(msg)) if msg == "Test error"
        ));
    }

    #[test]
    fn test_validation_result_merge() {
        let mut result1 = ValidationResult::success();
        result1.add_field_error("field1", "Error 1");

        let mut result2 = ValidationResult::success();
        result2.add_field_error("field2", "Error 2");

        result1.merge(result2);
        assert!(!result1.valid);
        assert!(result1.field_errors.contains_key("field1"));
        assert!(result1.field_errors.contains_key("field2"));
    }

    #[test]
    fn test_error_message_lists_fields_in_order() {
        let mut result = ValidationResult::success();
        result.add_field_error("title", "Must not be blank");
        result.add_field_error("link", "Invalid URL");

        let err = result.ensure_valid().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: link: Invalid URL; title: Must not be blank"
        );
    }

    #[test]
    fn test_validate_length_counts_chars() {
        assert!(ValidationRules::validate_length("ñandú", "f", Some(5), Some(5)).valid);
        assert!(!ValidationRules::validate_length("", "f", Some(1), None).valid);
        assert!(!ValidationRules::validate_length("too long", "f", None, Some(5)).valid);
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(!ValidationRules::validate_not_blank("   ", "title").valid);
        assert!(ValidationRules::validate_not_blank(" x ", "title").valid);
    }
}
