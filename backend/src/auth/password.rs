//! Password hashing and verification with Argon2id
//!
//! Hashes are stored as PHC strings (`$argon2id$v=19$...`) in the
//! `password_hash` column of `users`.

use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash a password with a fresh random salt. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
///
/// `Ok(false)` means mismatch; `Err` means the stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::PasswordHash(format!("Invalid password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Check `password` against an account's stored hash.
///
/// Without an account the password is still verified against a fixed
/// hash, so a missing user costs the same Argon2 run as a wrong password.
pub fn check_credentials(password: &str, stored_hash: Option<&str>) -> bool {
    let Some(hash) = stored_hash else {
        let _ = verify_password(password, dummy_hash());
        return false;
    };

    verify_password(password, hash).unwrap_or_else(|e| {
        tracing::warn!("Unreadable stored password hash: {}", e);
        false
    })
}

fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| {
        hash_password("enote-absent-account").unwrap_or_else(|e| {
            tracing::error!("Could not prepare login hash: {}", e);
            String::new()
        })
    })
}

#[cfg(test)]
pub(crate) fn dummy_hash_prepared() -> bool {
    DUMMY_HASH.get().is_some_and(|h| h.starts_with("$argon2id$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pass123a").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("pass123a", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let a = hash_password("same1pass").unwrap();
        let b = hash_password("same1pass").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("x", "not-a-phc-string").is_err());
        assert!(!check_credentials("x", Some("not-a-phc-string")));
    }

    #[test]
    fn test_check_credentials_without_account_runs_argon2() {
        assert!(!check_credentials("enote-absent-account", None));
        assert!(dummy_hash_prepared());
        assert!(verify_password("enote-absent-account", dummy_hash()).unwrap());
    }

    #[test]
    fn test_check_credentials_with_account() {
        let hash = hash_password("pass123a").unwrap();
        assert!(check_credentials("pass123a", Some(&hash)));
        assert!(!check_credentials("wrong", Some(&hash)));
    }
}
