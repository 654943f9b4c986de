//! Password hashing and verification (Argon2id, PHC string format).

use crate::{CoreError, CoreResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use std::sync::LazyLock;

/// Hash checked against when the account does not exist, so a lookup miss costs the same as a
/// wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("not-a-real-password").ok());

/// Hashes a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::PasswordHash(e.to_string()))
}

/// Checks `password` against a stored PHC hash.
///
/// When `stored` is `None` the password is still run through Argon2 against a dummy hash and
/// `false` is returned.
pub fn verify_password(password: &str, stored: Option<&str>) -> bool {
    let stored = match stored {
        Some(hash) => hash,
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = check(password, dummy);
            }
            return false;
        }
    };
    check(password, stored)
}

fn check(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", Some(&hash)));
        assert!(!verify_password("wrong horse", Some(&hash)));
    }

    #[test]
    fn test_missing_or_garbage_hash_never_verifies() {
        assert!(!verify_password("anything", None));
        assert!(!verify_password("anything", Some("plaintext")));
    }
}
