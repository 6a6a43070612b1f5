//! # Tenauth (Multi-tenant Authentication Service)
//!
//! `tenauth` is an authentication-as-a-service backend. Projects are the
//! tenant boundary: each registers once, receives a public uid and a
//! one-time-revealed secret, and configures its own policy (password rules,
//! allowed roles, login methods).
//!
//! ## Tenant Model (Projects and Accounts)
//!
//! - **One-time credentials:** The project secret is returned in plaintext
//!   exactly once, at registration or rotation. Only its bcrypt hash is
//!   persisted; revocation nulls the hash and blocks authentication until a
//!   rotation installs a new secret.
//! - **Scoped uniqueness:** `(username, project)` and `(email, project)` are
//!   unique; the same person may reuse both across different projects.
//! - **Soft deletes:** Deleted projects stay on disk but disappear from
//!   authentication and account lookups.
//!
//! ## Tokens
//!
//! Accounts receive HS256 access/refresh JWT pairs with independent signing
//! secrets and TTLs. Refresh tokens are tracked per account as a revocable
//! set (only their SHA-256 hashes are stored) and rotated atomically: the
//! presented token's removal and the replacement's insertion share one
//! database transaction, so a replayed token always fails the membership
//! check.
//!
//! Tenant authentication failures are deliberately indistinguishable —
//! unknown uid, revoked credentials, and a wrong secret all produce the same
//! `401` — to prevent project-id enumeration.

pub mod api;
pub mod cli;
pub mod token;
pub mod vault;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
