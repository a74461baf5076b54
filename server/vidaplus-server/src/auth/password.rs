use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::ApiError;

/// Argon2id password hashing.
///
/// Hashing is CPU-bound, so both operations run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PasswordService;

impl PasswordService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash a password with a fresh random salt
    ///
    /// # Errors
    ///
    /// Fails when hashing fails or the blocking task is cancelled.
    pub async fn hash(&self, password: &str) -> Result<String, ApiError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))
        })
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {e}")))?
    }

    /// Check a password against a stored PHC hash. A malformed stored hash
    /// counts as a mismatch.
    ///
    /// # Errors
    ///
    /// Fails only when the blocking task is cancelled.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, ApiError> {
        let password = password.to_owned();
        let stored_hash = stored_hash.to_owned();
        tokio::task::spawn_blocking(move || {
            PasswordHash::new(&stored_hash).is_ok_and(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let service = PasswordService::new();
        let hash = service.hash("Paciente123!").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("Paciente123!", &hash).await.unwrap());
        assert!(!service.verify("Paciente123?", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn salts_differ_between_hashes() {
        let service = PasswordService::new();
        let first = service.hash("Admin@123").await.unwrap();
        let second = service.hash("Admin@123").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        let service = PasswordService::new();
        assert!(!service.verify("Admin@123", "not-a-phc-string").await.unwrap());
    }
}
