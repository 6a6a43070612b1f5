//! Project credential generation.
//!
//! The public uid and the secret are generated exactly once, at registration.
//! Only the raw secret's bcrypt hash is persisted; the raw value is returned
//! to the caller a single time.

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng, RngCore};

use crate::api::error::ApiError;

/// Public project identifiers look like `prjAb12Cd34Ef56`.
pub(super) const UID_PREFIX: &str = "prj";
const UID_RANDOM_CHARS: usize = 12;
const SECRET_BYTES: usize = 16;

/// Generate a new public project uid.
///
/// Collisions are negligible but still guarded by a unique index and a retry
/// in storage.
pub(super) fn generate_uid() -> String {
    let suffix: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(UID_RANDOM_CHARS)
        .map(char::from)
        .collect();
    format!("{UID_PREFIX}{suffix}")
}

/// Generate a new raw project secret (16 random bytes, hex-encoded).
///
/// # Errors
///
/// Returns an internal error if the system RNG fails.
pub(super) fn generate_secret() -> Result<String, ApiError> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| ApiError::Internal("failed to generate project secret"))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_has_prefix_and_length() {
        let uid = generate_uid();
        assert!(uid.starts_with(UID_PREFIX));
        assert_eq!(uid.len(), UID_PREFIX.len() + UID_RANDOM_CHARS);
        assert!(uid[UID_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn uids_are_unique() {
        let first = generate_uid();
        let second = generate_uid();
        assert_ne!(first, second);
    }

    #[test]
    fn secret_is_32_hex_chars() {
        let secret = generate_secret().unwrap();
        assert_eq!(secret.len(), SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secrets_are_unique() {
        let first = generate_secret().unwrap();
        let second = generate_secret().unwrap();
        assert_ne!(first, second);
    }
}
