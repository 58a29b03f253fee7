//! Patient password storage.
//!
//! Passwords are kept as argon2id PHC strings in `patients.password_hash`.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::LazyLock;

/// Stand-in hash checked when a login matches no patient, so an unknown login
/// costs the same argon2 verification as a wrong password.
static UNKNOWN_LOGIN_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no patient has this password").ok());

/// Derive the PHC string stored for a patient's password. Every call draws a
/// fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow!("Failed to hash password: {}", e))
}

/// Check a login attempt against a stored hash. An unparseable hash is an
/// error, a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Run one verification against the stand-in hash and reject. Used for
/// logins that match no patient.
pub fn reject_unknown_login(password: &str) -> bool {
    match UNKNOWN_LOGIN_HASH.as_deref() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => tracing::warn!("Stand-in password hash unavailable"),
    }
    false
}
