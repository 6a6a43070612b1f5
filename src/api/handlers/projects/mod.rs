//! Project (tenant) endpoints: registration, secret rotation, credential
//! revocation, and soft delete.
//!
//! Registration is the only time the raw project secret exists outside the
//! caller's hands; every other operation sees only the bcrypt hash.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::{api::error::ApiError, api::AppContext, vault};

pub(crate) mod credentials;
pub(crate) mod storage;
pub mod types;

use storage::ProjectAuthRecord;
use types::{
    OwnerRequest, ProjectCredentials, ProjectResponse, RegisterProjectRequest,
    RegisterProjectResponse, RotateSecretResponse,
};

/// Authenticate a project by public uid and presented secret.
///
/// A missing project, a revoked credential, and a wrong secret are
/// indistinguishable to the caller: all are `Unauthorized`. `NotFound` is
/// reserved for owner-scoped management lookups.
///
/// # Errors
///
/// Returns `ApiError::Unauthorized` on any authentication failure and
/// infrastructure errors when the lookup or hash comparison cannot run.
pub(crate) async fn authenticate_project(
    pool: &PgPool,
    uid: &str,
    presented_secret: String,
) -> Result<ProjectAuthRecord, ApiError> {
    let Some(record) = storage::find_for_auth(pool, uid).await? else {
        return Err(ApiError::Unauthorized);
    };

    let Some(secret_hash) = record.secret_hash.clone() else {
        // Credentials revoked; fails until a rotation installs a new secret.
        return Err(ApiError::Unauthorized);
    };

    if !vault::verify_blocking(presented_secret, secret_hash).await? {
        return Err(ApiError::Unauthorized);
    }

    Ok(record)
}

#[utoipa::path(
    post,
    path = "/v1/projects",
    request_body = RegisterProjectRequest,
    responses(
        (status = 201, description = "Project registered; the secret is shown exactly once.", body = RegisterProjectResponse),
        (status = 400, description = "Invalid input.", body = String),
    ),
    tag = "projects"
)]
/// Registers a project and returns its one-time credentials.
/// The secret is hashed before persistence and never retrievable again;
/// rotation is the only way to obtain a new one.
pub async fn register(
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<RegisterProjectRequest>,
) -> Result<Response, ApiError> {
    if payload.owner_id.trim().is_empty() {
        return Err(ApiError::Validation("Owner id is required.".to_string()));
    }

    let name = payload.details.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("Project name is required.".to_string()));
    }

    if payload
        .settings
        .roles
        .iter()
        .any(|role| role.name.trim().is_empty())
    {
        return Err(ApiError::Validation(
            "Role names must not be empty.".to_string(),
        ));
    }

    let secret = credentials::generate_secret()?;
    let secret_hash = vault::hash_blocking(secret.clone(), context.secret_hash_cost).await?;

    let inserted = storage::insert_project(
        &pool,
        &payload.owner_id,
        &payload.details,
        &payload.settings,
        &secret_hash,
    )
    .await?;

    let response = RegisterProjectResponse {
        project: ProjectResponse {
            uid: inserted.uid.clone(),
            owner_id: payload.owner_id,
            name: payload.details.name,
            description: payload.details.description,
            logo_url: payload.details.logo_url,
            settings: payload.settings,
            status: inserted.status,
            created_at: inserted.created_at,
        },
        credentials: ProjectCredentials {
            project_uid: inserted.uid,
            project_secret: secret,
        },
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[utoipa::path(
    post,
    path = "/v1/projects/{uid}/secret",
    request_body = OwnerRequest,
    params(("uid" = String, Path, description = "Public project uid")),
    responses(
        (status = 200, description = "Secret rotated; the new value is shown exactly once.", body = RotateSecretResponse),
        (status = 404, description = "Project not found for this owner."),
    ),
    tag = "projects"
)]
/// Rotates the project secret: the old secret is invalid the moment the new
/// hash is written. Scoped by `(uid, owner_id)`; a mismatch is a `404`.
pub async fn rotate_secret(
    Path(uid): Path<String>,
    context: Extension<Arc<AppContext>>,
    pool: Extension<PgPool>,
    Json(payload): Json<OwnerRequest>,
) -> Result<Response, ApiError> {
    let secret = credentials::generate_secret()?;
    let secret_hash = vault::hash_blocking(secret.clone(), context.secret_hash_cost).await?;

    let updated = storage::update_secret_hash(&pool, &uid, &payload.owner_id, &secret_hash).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("Project not found."));
    }

    let response = RotateSecretResponse {
        project_uid: uid,
        project_secret: secret,
    };
    Ok((StatusCode::OK, Json(response)).into_response())
}

#[utoipa::path(
    delete,
    path = "/v1/projects/{uid}/secret",
    request_body = OwnerRequest,
    params(("uid" = String, Path, description = "Public project uid")),
    responses(
        (status = 204, description = "Credentials revoked; authentication fails until a rotation."),
        (status = 404, description = "Project not found for this owner."),
    ),
    tag = "projects"
)]
/// Revokes the project credentials by nulling the stored secret hash.
pub async fn revoke_credentials(
    Path(uid): Path<String>,
    pool: Extension<PgPool>,
    Json(payload): Json<OwnerRequest>,
) -> Result<Response, ApiError> {
    let updated = storage::revoke_credentials(&pool, &uid, &payload.owner_id).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("Project not found."));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    delete,
    path = "/v1/projects/{uid}",
    request_body = OwnerRequest,
    params(("uid" = String, Path, description = "Public project uid")),
    responses(
        (status = 204, description = "Project soft-deleted."),
        (status = 404, description = "Project not found for this owner."),
    ),
    tag = "projects"
)]
/// Soft-deletes a project. The row is kept but excluded from authentication
/// and account lookups from this point on.
pub async fn soft_delete(
    Path(uid): Path<String>,
    pool: Extension<PgPool>,
    Json(payload): Json<OwnerRequest>,
) -> Result<Response, ApiError> {
    let updated = storage::soft_delete(&pool, &uid, &payload.owner_id).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("Project not found."));
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}
