//! Password hashing with Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use thiserror::Error;

/// Salt length in bytes before encoding.
const SALT_LENGTH: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hash error: {0}")]
    HashError(String),
    #[error("Password verify error: {0}")]
    VerifyError(String),
}

/// Hashes `password` into a PHC string (`$argon2id$...`) with a fresh random salt.
///
/// # Errors
///
/// Returns [`PasswordError::HashError`] if salting or hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; SALT_LENGTH];
    getrandom::fill(&mut salt_bytes).map_err(|e| PasswordError::HashError(e.to_string()))?;

    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::HashError(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks `password` against a stored PHC string.
///
/// # Errors
///
/// Returns [`PasswordError::VerifyError`] if `hash` is not a valid PHC string.
/// A wrong password is `Ok(false)`, not an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
