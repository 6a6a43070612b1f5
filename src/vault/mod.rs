//! Secret vault: one-way hashing and verification for project secrets and
//! account passwords.
//!
//! Hashes are salted bcrypt in the standard modular crypt format. Hashing is
//! deliberately slow, so async callers must go through [`hash_blocking`] /
//! [`verify_blocking`], which move the work onto the blocking thread pool.

use thiserror::Error;

/// Default bcrypt work factor, overridable from configuration.
pub const DEFAULT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Runtime(#[from] tokio::task::JoinError),
}

/// Hash a secret with a fresh random salt at the given cost.
///
/// # Errors
///
/// Returns `VaultError::Hash` if the cost is out of bcrypt's supported range
/// or the backend fails.
pub fn hash(secret: &str, cost: u32) -> Result<String, VaultError> {
    Ok(bcrypt::hash(secret, cost)?)
}

/// Verify a secret against a stored hash.
///
/// A malformed or empty stored hash is treated as a mismatch, not an error:
/// authentication against a revoked or corrupted credential must simply fail.
#[must_use]
pub fn verify(secret: &str, hash: &str) -> bool {
    bcrypt::verify(secret, hash).unwrap_or(false)
}

/// Run [`hash`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `VaultError::Hash` on backend failure or `VaultError::Runtime` if
/// the blocking task is cancelled.
pub async fn hash_blocking(secret: String, cost: u32) -> Result<String, VaultError> {
    tokio::task::spawn_blocking(move || hash(&secret, cost)).await?
}

/// Run [`verify`] on the blocking thread pool.
///
/// # Errors
///
/// Returns `VaultError::Runtime` if the blocking task is cancelled.
pub async fn verify_blocking(secret: String, hash: String) -> Result<bool, VaultError> {
    Ok(tokio::task::spawn_blocking(move || verify(&secret, &hash)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum bcrypt cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash("Str0ng!Pw", TEST_COST).unwrap();
        assert!(verify("Str0ng!Pw", &hashed));
        assert!(!verify("wrong", &hashed));
    }

    #[test]
    fn hash_is_salted() {
        let first = hash("same-secret", TEST_COST).unwrap();
        let second = hash("same-secret", TEST_COST).unwrap();
        assert_ne!(first, second);
        assert!(verify("same-secret", &first));
        assert!(verify("same-secret", &second));
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let hashed = hash("visible-secret", TEST_COST).unwrap();
        assert!(!hashed.contains("visible-secret"));
    }

    #[test]
    fn verify_malformed_hash_is_false() {
        assert!(!verify("anything", "not-a-bcrypt-hash"));
        assert!(!verify("anything", ""));
    }

    #[test]
    fn hash_rejects_invalid_cost() {
        assert!(hash("secret", 1).is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_round_trip() {
        let hashed = hash_blocking("secret".to_string(), TEST_COST)
            .await
            .unwrap();
        assert!(verify_blocking("secret".to_string(), hashed.clone())
            .await
            .unwrap());
        assert!(!verify_blocking("other".to_string(), hashed).await.unwrap());
    }
}
