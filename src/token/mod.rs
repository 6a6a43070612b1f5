//! Token issuer: signed, time-bounded bearer tokens carrying a subject id.
//!
//! Access and refresh tokens are HS256 JWTs with independent signing secrets
//! and TTLs. Verification is purely functional given a key; nothing here
//! touches persistence.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, DecodingKey, EncodingKey, Header,
    Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token")]
    Invalid,

    #[error("token signing key or ttl is not configured")]
    Configuration,
}

/// Signing secret and TTL for one token purpose (access or refresh).
#[derive(Debug, Clone)]
pub struct TokenConfig {
    secret: SecretString,
    ttl_seconds: u64,
}

impl TokenConfig {
    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: u64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }
}

/// The two token purposes the service issues, each with its own key.
#[derive(Debug, Clone)]
pub struct TokenKeys {
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
    // Random per-token id so two tokens minted for the same subject within
    // the same second are still distinct values.
    jti: String,
}

/// Issue a signed token for `subject`.
///
/// # Errors
///
/// Returns `TokenError::Configuration` when the signing secret is empty or
/// the TTL is zero, `TokenError::Invalid` if encoding fails.
pub fn issue(subject: Uuid, config: &TokenConfig) -> Result<String, TokenError> {
    if config.secret.expose_secret().is_empty() || config.ttl_seconds == 0 {
        return Err(TokenError::Configuration);
    }

    let now = get_current_timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        iat: now,
        exp: now + config.ttl_seconds,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.secret.expose_secret().as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|_| TokenError::Invalid)
}

/// Verify signature and expiry, returning the embedded subject id.
///
/// # Errors
///
/// Returns `TokenError::Expired` past the TTL, `TokenError::Invalid` on a bad
/// signature or structure, `TokenError::Configuration` on an empty secret.
pub fn verify(token: &str, config: &TokenConfig) -> Result<Uuid, TokenError> {
    if config.secret.expose_secret().is_empty() {
        return Err(TokenError::Configuration);
    }

    let key = DecodingKey::from_secret(config.secret.expose_secret().as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(token, &key, &validation).map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?;

    Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, ttl_seconds: u64) -> TokenConfig {
        TokenConfig::new(SecretString::from(secret.to_string()), ttl_seconds)
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let config = test_config("test-signing-key", 60);
        let subject = Uuid::new_v4();

        let token = issue(subject, &config).unwrap();
        assert_eq!(verify(&token, &config), Ok(subject));
    }

    #[test]
    fn verify_with_different_key_fails() {
        let config = test_config("key-one", 60);
        let other = test_config("key-two", 60);

        let token = issue(Uuid::new_v4(), &config).unwrap();
        assert_eq!(verify(&token, &other), Err(TokenError::Invalid));
    }

    #[test]
    fn verify_garbage_fails() {
        let config = test_config("test-signing-key", 60);
        assert_eq!(verify("not-a-token", &config), Err(TokenError::Invalid));
    }

    #[test]
    fn verify_expired_token_fails() {
        let config = test_config("test-signing-key", 60);
        let now = get_current_timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now.saturating_sub(120),
            exp: now.saturating_sub(60),
            jti: Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(b"test-signing-key");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert_eq!(verify(&token, &config), Err(TokenError::Expired));
    }

    #[test]
    fn issue_requires_configuration() {
        let empty_secret = test_config("", 60);
        assert_eq!(
            issue(Uuid::new_v4(), &empty_secret),
            Err(TokenError::Configuration)
        );

        let zero_ttl = test_config("test-signing-key", 0);
        assert_eq!(
            issue(Uuid::new_v4(), &zero_ttl),
            Err(TokenError::Configuration)
        );
    }

    #[test]
    fn tokens_for_same_subject_are_distinct() {
        let config = test_config("test-signing-key", 60);
        let subject = Uuid::new_v4();

        let first = issue(subject, &config).unwrap();
        let second = issue(subject, &config).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn subject_must_be_a_uuid() {
        let config = test_config("test-signing-key", 60);
        let now = get_current_timestamp();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            iat: now,
            exp: now + 60,
            jti: Uuid::new_v4().to_string(),
        };
        let key = EncodingKey::from_secret(b"test-signing-key");
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert_eq!(verify(&token, &config), Err(TokenError::Invalid));
    }
}
