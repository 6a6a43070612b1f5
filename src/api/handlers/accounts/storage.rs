//! SQL storage for accounts and their refresh-token set.
//!
//! Refresh-token rotation is a single transaction: the presented token's row
//! is deleted and the replacement inserted together, so two concurrent
//! rotations of the same token race on the row delete and exactly one wins.

use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::policy::LoginIdentifier;
use crate::api::error::{is_unique_violation, ApiError};

/// Fields returned after a successful signup insert.
pub(super) struct NewAccount {
    pub(super) id: Uuid,
    pub(super) created_at: String,
}

/// Minimal account data needed to verify a password.
pub(super) struct LoginRecord {
    pub(super) id: Uuid,
    pub(super) password_hash: String,
}

/// Outcome of a rotate attempt against the token set.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum RotateOutcome {
    Rotated,
    /// The presented token was not a member of the set: already rotated,
    /// revoked, or never issued. Possible replay.
    NotFound,
}

/// Insert a new account scoped to `project_uid`.
///
/// # Errors
///
/// Returns `ApiError::Conflict` when `(username, project)` or
/// `(email, project)` already exists, `ApiError::Database` otherwise.
pub(super) async fn insert_account(
    pool: &PgPool,
    project_uid: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Option<&str>,
) -> Result<NewAccount, ApiError> {
    let query = r#"
        INSERT INTO accounts
            (project_uid, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING
            id,
            to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
    "#;
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(project_uid)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match result {
        Ok(row) => Ok(NewAccount {
            id: row.get("id"),
            created_at: row.get("created_at"),
        }),
        Err(err) if is_unique_violation(&err) => Err(ApiError::Conflict(
            "An account with this username or email already exists in this project.",
        )),
        Err(err) => Err(err.into()),
    }
}

/// Look up an account by login identifier within a project.
pub(super) async fn find_for_login(
    pool: &PgPool,
    project_uid: &str,
    identifier: &LoginIdentifier<'_>,
) -> Result<Option<LoginRecord>, sqlx::Error> {
    let (query, value) = match identifier {
        LoginIdentifier::Username(username) => (
            r"
            SELECT id, password_hash
            FROM accounts
            WHERE project_uid = $1 AND username = $2
            LIMIT 1
            ",
            *username,
        ),
        LoginIdentifier::Email(email) => (
            r"
            SELECT id, password_hash
            FROM accounts
            WHERE project_uid = $1 AND email = $2
            LIMIT 1
            ",
            *email,
        ),
    };
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(project_uid)
        .bind(value)
        .fetch_optional(pool)
        .instrument(span)
        .await?;

    Ok(row.map(|row| LoginRecord {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

/// Add a freshly issued refresh token to the account's set.
///
/// Multiple concurrently-valid tokens per account are expected (one per
/// device/session).
pub(super) async fn insert_refresh_token(
    pool: &PgPool,
    account_id: Uuid,
    token_hash: &[u8],
) -> Result<(), sqlx::Error> {
    let query = r"
        INSERT INTO account_refresh_tokens (account_id, token_hash)
        VALUES ($1, $2)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(())
}

/// Atomically replace `presented_hash` with `replacement_hash`.
///
/// Delete and insert share one transaction: either both are durable or
/// neither is, and a concurrent rotation of the same token loses the race on
/// the row delete and reports `NotFound`.
pub(super) async fn rotate_refresh_token(
    pool: &PgPool,
    account_id: Uuid,
    presented_hash: &[u8],
    replacement_hash: &[u8],
) -> Result<RotateOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let delete = r"
        DELETE FROM account_refresh_tokens
        WHERE account_id = $1 AND token_hash = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = delete
    );
    let deleted = sqlx::query(delete)
        .bind(account_id)
        .bind(presented_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(RotateOutcome::NotFound);
    }

    let insert = r"
        INSERT INTO account_refresh_tokens (account_id, token_hash)
        VALUES ($1, $2)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = insert
    );
    sqlx::query(insert)
        .bind(account_id)
        .bind(replacement_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await?;

    tx.commit().await?;
    Ok(RotateOutcome::Rotated)
}

/// Remove one token from the set. Returns `false` when it was not a member.
pub(super) async fn revoke_refresh_token(
    pool: &PgPool,
    account_id: Uuid,
    token_hash: &[u8],
) -> Result<bool, sqlx::Error> {
    let query = r"
        DELETE FROM account_refresh_tokens
        WHERE account_id = $1 AND token_hash = $2
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(account_id)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Empty the account's token set ("log out everywhere").
pub(super) async fn revoke_all_refresh_tokens(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let query = r"
        DELETE FROM account_refresh_tokens
        WHERE account_id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_outcome_debug_names() {
        assert_eq!(format!("{:?}", RotateOutcome::Rotated), "Rotated");
        assert_eq!(format!("{:?}", RotateOutcome::NotFound), "NotFound");
    }

    #[test]
    fn login_record_holds_values() {
        let record = LoginRecord {
            id: Uuid::nil(),
            password_hash: "$2b$10$hash".to_string(),
        };
        assert_eq!(record.id, Uuid::nil());
        assert_eq!(record.password_hash, "$2b$10$hash");
    }
}
