//! Credential hashing. Secrets are stored as Argon2 PHC strings and never
//! in plaintext; each hash carries its own random salt.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))
}

/// Constant-time comparison against a stored hash. A mismatch is `Ok(false)`;
/// only an unparseable stored hash is an error.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(stored).map_err(|e| anyhow::anyhow!("stored hash unreadable: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_hash_is_a_phc_string_without_the_plaintext() {
        let hash = hash_password("pw123456").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("pw123456"));
    }

    #[test]
    fn correct_secret_verifies() {
        let hash = hash_password("pw123456").expect("hash");
        assert!(verify_password("pw123456", &hash).expect("verify"));
    }

    #[test]
    fn wrong_secret_is_ok_false_not_error() {
        let hash = hash_password("pw123456").expect("hash");
        assert!(!verify_password("hunter2", &hash).expect("verify"));
    }

    #[test]
    fn same_secret_hashes_differently_each_time() {
        let a = hash_password("same-input").expect("hash");
        let b = hash_password("same-input").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn unreadable_stored_hash_is_an_error() {
        assert!(verify_password("anything", "plainly-not-a-hash").is_err());
    }
}
