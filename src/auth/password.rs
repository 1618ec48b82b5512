/// Password Hashing and Verification
///
/// bcrypt with a configurable work factor. Hashing is CPU bound, so both
/// operations run on the blocking pool and only suspend the calling task.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

/// Work factor bounds accepted by bcrypt
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password with a fresh salt
    ///
    /// # Errors
    /// - Validation error if the password is empty or contains a NUL byte
    /// - Internal error if bcrypt fails
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        ensure_hashable(password)?;
        let password = password.to_owned();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || hash(password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored bcrypt hash
    ///
    /// # Errors
    /// Returns an internal error if the stored hash is malformed
    pub async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        if ensure_hashable(password).is_err() {
            return Ok(false);
        }
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();

        tokio::task::spawn_blocking(move || verify(password, &password_hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

fn ensure_hashable(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }
    if password.contains('\0') {
        return Err(ValidationError::InvalidFormat("password".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_BCRYPT_COST)
    }

    #[tokio::test]
    async fn test_hash_password() {
        let password = "Abcd1234!";
        let hash = hasher().hash(password).await.expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_cost_is_encoded_in_hash() {
        let hash = hasher().hash("Abcd1234!").await.unwrap();
        assert!(hash.starts_with("$2b$04$"), "{}", hash);
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let first = hasher().hash("Abcd1234!").await.unwrap();
        let second = hasher().hash("Abcd1234!").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_verify_password() {
        let hash = hasher().hash("Abcd1234!").await.unwrap();

        assert!(hasher().verify("Abcd1234!", &hash).await.unwrap());
        assert!(!hasher().verify("Abcd1234?", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_and_nul_passwords_are_invalid_input() {
        assert!(matches!(
            hasher().hash("").await,
            Err(AppError::Validation(ValidationError::EmptyField(_)))
        ));
        assert!(matches!(
            hasher().hash("abc\0def").await,
            Err(AppError::Validation(ValidationError::InvalidFormat(_)))
        ));
    }

    #[tokio::test]
    async fn test_malformed_hash_is_internal_error() {
        let result = hasher().verify("Abcd1234!", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
