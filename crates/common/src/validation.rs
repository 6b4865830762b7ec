//! Validation utilities.
//!
//! Validators for account fields and links. Lengths are counted in
//! characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_-][A-Za-z0-9_-]{2,29}$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap()
});

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validate an email address.
///
/// # Examples
///
/// ```
/// use studyhub_common::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.len() > 254 {
        return Err("Email cannot be longer than 254 characters".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a username: 3-30 of `[A-Za-z0-9_-]`, not starting with a digit.
///
/// # Examples
///
/// ```
/// use studyhub_common::validation::validate_username;
///
/// assert!(validate_username("ada_l").is_ok());
/// assert!(validate_username("1ada").is_err());
/// ```
pub fn validate_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if !(3..=30).contains(&len) {
        return Err("Username must be between 3 and 30 characters".to_string());
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(
            "Username may contain letters, digits, '_' and '-' and must not start with a digit"
                .to_string(),
        );
    }

    Ok(())
}

/// Validate password strength: 8-128 characters with a letter and a digit.
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_LENGTH
        ));
    }
    if len > PASSWORD_MAX_LENGTH {
        return Err(format!(
            "Password cannot be longer than {} characters",
            PASSWORD_MAX_LENGTH
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err("Password must contain at least one letter and one digit".to_string());
    }

    Ok(())
}

/// Validate an http(s) URL.
///
/// # Examples
///
/// ```
/// use studyhub_common::validation::validate_url;
///
/// assert!(validate_url("https://leetcode.com/problems/two-sum/").is_ok());
/// assert!(validate_url("not-a-url").is_err());
/// ```
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if url.len() > 2048 {
        return Err("URL cannot be longer than 2048 characters".to_string());
    }

    if !URL_REGEX.is_match(url) {
        return Err("Invalid URL format (must start with http:// or https://)".to_string());
    }

    url::Url::parse(url).map_err(|e| format!("Invalid URL: {}", e))?;

    Ok(())
}

/// Validate a string length, in characters, is within a range.
///
/// # Examples
///
/// ```
/// use studyhub_common::validation::validate_length;
///
/// assert!(validate_length("hello", 1, 10).is_ok());
/// assert!(validate_length("", 1, 10).is_err());
/// assert!(validate_length("too long string", 1, 5).is_err());
/// ```
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), String> {
    let len = value.chars().count();

    if len < min {
        return Err(format!("Value must be at least {} characters long", min));
    }

    if len > max {
        return Err(format!("Value cannot be longer than {} characters", max));
    }

    Ok(())
}

/// Validate a number is within a range.
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
) -> Result<(), String> {
    if value < min {
        return Err(format!("Value must be at least {}", min));
    }

    if value > max {
        return Err(format!("Value cannot be greater than {}", max));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.user@example.co.uk").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@example").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username("Ada_Lovelace-1815").is_ok());
        assert!(validate_username("_underscore").is_ok());

        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("9lives").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("dot.name").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password1").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("allletters").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://localhost:8080/path?q=1").is_ok());

        assert!(validate_url("").is_err());
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_length_counts_chars() {
        assert!(validate_length("héllo", 5, 5).is_ok());
        assert!(validate_length("", 1, 10).is_err());
        assert!(validate_length("12345678901", 1, 10).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range(5, 1, 10).is_ok());
        assert!(validate_range(0, 1, 10).is_err());
        assert!(validate_range(11, 1, 10).is_err());
    }
}
