//! SQL storage for project records.
//!
//! Lookups exclude soft-deleted rows; management updates are scoped by
//! `(uid, owner_id)` so a caller without the owner reference cannot touch the
//! record.

use sqlx::{PgPool, Row};
use tracing::Instrument;

use super::{
    credentials,
    types::{ProjectDetails, ProjectSettings},
};
use crate::api::error::{is_unique_violation, ApiError};

/// How many fresh uids to try before giving up on registration.
const UID_INSERT_ATTEMPTS: usize = 3;

/// Fields returned from a successful insert, alongside the generated uid.
pub(super) struct NewProject {
    pub(super) uid: String,
    pub(super) status: String,
    pub(super) created_at: String,
}

/// Minimal project data needed to authenticate and enforce policy.
pub(crate) struct ProjectAuthRecord {
    pub(crate) uid: String,
    // None once credentials have been revoked.
    pub(crate) secret_hash: Option<String>,
    pub(crate) settings: ProjectSettings,
}

/// Insert a new project, retrying with a fresh uid on the unlikely collision.
///
/// # Errors
///
/// Returns `ApiError::Internal` when no unique uid could be generated and
/// `ApiError::Database` on any other failure.
pub(super) async fn insert_project(
    pool: &PgPool,
    owner_id: &str,
    details: &ProjectDetails,
    settings: &ProjectSettings,
    secret_hash: &str,
) -> Result<NewProject, ApiError> {
    let settings_json = serde_json::to_string(settings)
        .map_err(|_| ApiError::Internal("failed to serialize project settings"))?;

    let query = r#"
        INSERT INTO projects
            (owner_id, uid, secret_hash, name, description, logo_url, settings)
        VALUES ($1, $2, $3, $4, $5, $6, $7::jsonb)
        RETURNING
            status::text AS status,
            to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
    "#;

    for _ in 0..UID_INSERT_ATTEMPTS {
        let uid = credentials::generate_uid();
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(owner_id)
            .bind(&uid)
            .bind(secret_hash)
            .bind(&details.name)
            .bind(details.description.as_deref())
            .bind(details.logo_url.as_deref())
            .bind(&settings_json)
            .fetch_one(pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => {
                return Ok(NewProject {
                    uid,
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                })
            }
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err.into()),
        }
    }

    Err(ApiError::Internal("failed to generate a unique project uid"))
}

/// Look up a non-deleted project by uid for authentication.
///
/// # Errors
///
/// Returns `ApiError::Database` on lookup failure and `ApiError::Internal`
/// when the stored settings document no longer deserializes.
pub(crate) async fn find_for_auth(
    pool: &PgPool,
    uid: &str,
) -> Result<Option<ProjectAuthRecord>, ApiError> {
    let query = r"
        SELECT uid, secret_hash, settings::text AS settings
        FROM projects
        WHERE uid = $1 AND is_deleted = FALSE
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(uid)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let settings_json: String = row.get("settings");
    let settings = serde_json::from_str(&settings_json)
        .map_err(|_| ApiError::Internal("stored project settings are corrupted"))?;

    Ok(Some(ProjectAuthRecord {
        uid: row.get("uid"),
        secret_hash: row.get("secret_hash"),
        settings,
    }))
}

/// Replace the secret hash for `(uid, owner_id)`; the old secret dies here.
///
/// Returns the number of rows updated (zero when the project is unknown,
/// deleted, or owned by someone else).
pub(super) async fn update_secret_hash(
    pool: &PgPool,
    uid: &str,
    owner_id: &str,
    secret_hash: &str,
) -> Result<u64, sqlx::Error> {
    let query = r"
        UPDATE projects
        SET secret_hash = $1
        WHERE uid = $2 AND owner_id = $3 AND is_deleted = FALSE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(secret_hash)
        .bind(uid)
        .bind(owner_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected())
}

/// Null the secret hash so every future authentication fails until a rotation.
pub(super) async fn revoke_credentials(
    pool: &PgPool,
    uid: &str,
    owner_id: &str,
) -> Result<u64, sqlx::Error> {
    let query = r"
        UPDATE projects
        SET secret_hash = NULL
        WHERE uid = $1 AND owner_id = $2 AND is_deleted = FALSE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(uid)
        .bind(owner_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected())
}

/// Soft-delete: the row stays, every lookup from now on skips it.
pub(super) async fn soft_delete(
    pool: &PgPool,
    uid: &str,
    owner_id: &str,
) -> Result<u64, sqlx::Error> {
    let query = r"
        UPDATE projects
        SET is_deleted = TRUE
        WHERE uid = $1 AND owner_id = $2 AND is_deleted = FALSE
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(uid)
        .bind(owner_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected())
}
