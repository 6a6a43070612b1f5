//! Error taxonomy shared by all handlers.
//!
//! Every failure maps to a stable HTTP response. Database and hashing
//! failures are logged server-side and surfaced as `500` without leaking
//! details; plaintext secrets never appear in any variant.

use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;

use crate::{token::TokenError, vault::VaultError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(&'static str),

    // One variant for "project absent", "secret mismatch", and "credentials
    // revoked": callers must not be able to tell tenants apart.
    #[error("invalid credentials")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Configuration(&'static str),

    #[error("{0}")]
    Internal(&'static str),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Invalid => Self::Unauthorized,
            TokenError::Configuration => {
                Self::Configuration("token signing key or ttl is not configured")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Conflict(message) => (StatusCode::CONFLICT, message).into_response(),
            Self::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials.").into_response()
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
            Self::Configuration(message) => {
                error!("Configuration error: {message}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Internal(message) => {
                error!("Internal error: {message}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Database(err) => {
                error!("Database error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Self::Vault(err) => {
                error!("Vault error: {err}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Returns `true` when `err` is a database unique-violation (SQLSTATE `23505`).
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_collapse_to_unauthorized() {
        assert!(matches!(
            ApiError::from(TokenError::Expired),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(TokenError::Invalid),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(TokenError::Configuration),
            ApiError::Configuration(_)
        ));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (
                ApiError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Conflict("dup"), StatusCode::CONFLICT),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("missing"), StatusCode::NOT_FOUND),
            (
                ApiError::Configuration("unset"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn unauthorized_message_does_not_distinguish_causes() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn is_unique_violation_ignores_other_errors() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
