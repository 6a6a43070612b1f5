//! Account endpoints scoped to an authenticated project: signup and login.
//!
//! Every request here carries the project secret as a bearer credential; the
//! project is authenticated before any account data is touched, and input is
//! validated against that project's settings.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use std::sync::Arc;

use super::{extract_bearer_token, projects};
use crate::{api::error::ApiError, api::AppContext, vault};

pub(crate) mod policy;
pub(crate) mod storage;
pub(crate) mod tokens;
pub mod types;

use types::{AccountResponse, LoginRequest, SignupRequest, TokenPairResponse};

#[utoipa::path(
    post,
    path = "/v1/projects/{uid}/accounts",
    request_body = SignupRequest,
    params(("uid" = String, Path, description = "Public project uid")),
    responses(
        (status = 201, description = "Account created.", body = AccountResponse),
        (status = 400, description = "Input failed the project's policy.", body = String),
        (status = 401, description = "Missing or invalid project credentials."),
        (status = 409, description = "Username or email already taken within the project.", body = String),
    ),
    tag = "accounts"
)]
/// Creates an account under the authenticated project.
/// Uniqueness of `(username, project)` and `(email, project)` is enforced by
/// the database and surfaced as `409`; the same username may exist under a
/// different project.
pub async fn signup(
    Path(uid): Path<String>,
    headers: HeaderMap,
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<SignupRequest>,
) -> Result<Response, ApiError> {
    let secret = extract_bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let project = projects::authenticate_project(&pool, &uid, secret).await?;

    policy::validate_signup(
        &project.settings,
        &payload.username,
        &payload.email,
        &payload.password,
        payload.role.as_deref(),
    )?;

    // The plaintext password exists only up to this point; storage receives
    // the hash and nothing ever re-hashes an already-hashed value.
    let password_hash = vault::hash_blocking(payload.password, context.secret_hash_cost).await?;

    let account = storage::insert_account(
        &pool,
        &project.uid,
        &payload.username,
        &payload.email,
        &password_hash,
        payload.role.as_deref(),
    )
    .await?;

    let response = AccountResponse {
        id: account.id.to_string(),
        username: payload.username,
        email: payload.email,
        role: payload.role,
        created_at: account.created_at,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/projects/{uid}/accounts/login",
    request_body = LoginRequest,
    params(("uid" = String, Path, description = "Public project uid")),
    responses(
        (status = 200, description = "Credentials verified; access/refresh pair issued.", body = TokenPairResponse),
        (status = 400, description = "No enabled login method matches the request.", body = String),
        (status = 401, description = "Invalid project or account credentials."),
    ),
    tag = "accounts"
)]
/// Verifies an account password and issues an access/refresh token pair.
/// An unknown identifier and a wrong password are indistinguishable: both
/// return `401`.
pub async fn login(
    Path(uid): Path<String>,
    headers: HeaderMap,
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let secret = extract_bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let project = projects::authenticate_project(&pool, &uid, secret).await?;

    let identifier = policy::login_identifier(
        &project.settings,
        payload.username.as_deref(),
        payload.email.as_deref(),
    )?;

    let Some(account) = storage::find_for_login(&pool, &project.uid, &identifier).await? else {
        return Err(ApiError::Unauthorized);
    };

    if !vault::verify_blocking(payload.password, account.password_hash).await? {
        return Err(ApiError::Unauthorized);
    }

    let pair = tokens::issue_pair(&context, &pool, account.id).await?;
    Ok((StatusCode::OK, Json(pair)).into_response())
}
