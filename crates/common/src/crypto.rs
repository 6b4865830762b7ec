//! Cryptography utilities.
//!
//! Password hashing and random invite codes.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;

/// Characters used in invite codes. `0`, `O`, `1` and `I` are left out so
/// codes can be read aloud or copied from a screenshot.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Length of a group invite code
pub const INVITE_CODE_LENGTH: usize = 8;

/// Hash a password using Argon2.
///
/// # Examples
///
/// ```
/// use studyhub_common::crypto::hash_password;
///
/// let hash = hash_password("my_secure_password1").expect("Failed to hash password");
/// assert!(hash.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Failed to hash password")?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a PHC hash string.
///
/// Returns `Ok(false)` for a wrong password and an error only when the
/// stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("Invalid password hash format")?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Generate a random group invite code.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LENGTH)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` has the shape of an invite code. Lowercase input is
/// accepted; callers normalize with `to_ascii_uppercase` before lookup.
pub fn is_valid_invite_code(code: &str) -> bool {
    code.len() == INVITE_CODE_LENGTH
        && code
            .bytes()
            .all(|b| INVITE_CODE_ALPHABET.contains(&b.to_ascii_uppercase()))
}
