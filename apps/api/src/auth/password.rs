//! Argon2id password hashing. Hashing is CPU-bound, so both operations run on
//! the blocking pool instead of a runtime worker.

use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hashes `password` into a PHC string with a fresh random salt.
pub async fn hash_password(password: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| anyhow!("failed to hash password: {e}"))
    })
    .await
    .context("password hashing task panicked")?
}

/// Checks `password` against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
pub async fn verify_password(password: String, stored_hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)
            .map_err(|e| anyhow!("stored password hash is malformed: {e}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .context("password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("correct horse".to_string()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));

        assert!(verify_password("correct horse".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password("wrong horse".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_salts_differ() {
        let a = hash_password("same-password".to_string()).await.unwrap();
        let b = hash_password("same-password".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_malformed_hash_is_error() {
        let result = verify_password("anything".to_string(), "not-a-phc-string".to_string()).await;
        assert!(result.is_err());
    }
}
