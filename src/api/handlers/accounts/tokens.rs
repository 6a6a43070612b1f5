//! Refresh-token lifecycle endpoints: rotate, revoke, revoke-all.
//!
//! Presented tokens are verified for signature and expiry first; membership
//! in the account's stored set is checked second, so a replayed token fails
//! with `404` rather than `401`.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::{
    storage,
    storage::RotateOutcome,
    types::{RefreshRequest, RevokeRequest, TokenPairResponse},
};
use crate::{api::error::ApiError, api::AppContext, token};

/// Hash a raw refresh token for storage and membership checks.
/// Raw tokens never touch the database.
pub(super) fn hash_refresh_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Issue a fresh access/refresh pair for `account_id` and record the refresh
/// token in the account's set.
pub(super) async fn issue_pair(
    context: &AppContext,
    pool: &PgPool,
    account_id: Uuid,
) -> Result<TokenPairResponse, ApiError> {
    let access_token = token::issue(account_id, &context.token_keys.access)?;
    let refresh_token = token::issue(account_id, &context.token_keys.refresh)?;

    storage::insert_refresh_token(pool, account_id, &hash_refresh_token(&refresh_token)).await?;

    Ok(TokenPairResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: context.token_keys.access.ttl_seconds(),
    })
}

#[utoipa::path(
    post,
    path = "/v1/tokens/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token rotated; the presented token is no longer valid.", body = TokenPairResponse),
        (status = 401, description = "Signature or expiry check failed."),
        (status = 404, description = "Token is not a member of the account's set (possible replay)."),
    ),
    tag = "tokens"
)]
/// Rotates a refresh token: removes the presented token and issues a
/// replacement in one transaction, then returns a new access/refresh pair.
pub async fn refresh(
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Response, ApiError> {
    let account_id = token::verify(&payload.refresh_token, &context.token_keys.refresh)?;

    let replacement = token::issue(account_id, &context.token_keys.refresh)?;
    let outcome = storage::rotate_refresh_token(
        &pool,
        account_id,
        &hash_refresh_token(&payload.refresh_token),
        &hash_refresh_token(&replacement),
    )
    .await?;

    if outcome == RotateOutcome::NotFound {
        // A structurally valid token outside the set was already used or
        // revoked; worth a trace when hunting replay attempts.
        warn!(account_id = %account_id, "refresh token not in account set");
        return Err(ApiError::NotFound("Refresh token not found."));
    }

    let access_token = token::issue(account_id, &context.token_keys.access)?;
    let response = TokenPairResponse {
        access_token,
        refresh_token: replacement,
        token_type: "Bearer".to_string(),
        expires_in: context.token_keys.access.ttl_seconds(),
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/tokens/revoke",
    request_body = RevokeRequest,
    responses(
        (status = 204, description = "Token removed from the account's set."),
        (status = 401, description = "Signature or expiry check failed."),
        (status = 404, description = "Token is not a member of the account's set."),
    ),
    tag = "tokens"
)]
/// Revokes a single refresh token ("log out this session").
pub async fn revoke(
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<RevokeRequest>,
) -> Result<Response, ApiError> {
    let account_id = token::verify(&payload.refresh_token, &context.token_keys.refresh)?;

    let revoked = storage::revoke_refresh_token(
        &pool,
        account_id,
        &hash_refresh_token(&payload.refresh_token),
    )
    .await?;

    if !revoked {
        return Err(ApiError::NotFound("Refresh token not found."));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/v1/tokens/revoke-all",
    request_body = RevokeRequest,
    responses(
        (status = 204, description = "Every refresh token for the account removed."),
        (status = 401, description = "Signature or expiry check failed."),
    ),
    tag = "tokens"
)]
/// Revokes every refresh token for the account identified by the presented
/// token ("log out everywhere"). The set is emptied unconditionally; this is
/// the credential-compromise response.
pub async fn revoke_all(
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<RevokeRequest>,
) -> Result<Response, ApiError> {
    let account_id = token::verify(&payload.refresh_token, &context.token_keys.refresh)?;

    storage::revoke_all_refresh_tokens(&pool, account_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_token_hash_is_stable() {
        let first = hash_refresh_token("token");
        let second = hash_refresh_token("token");
        let different = hash_refresh_token("other");
        assert_eq!(first, second);
        assert_ne!(first, different);
        assert_eq!(first.len(), 32);
    }
}
