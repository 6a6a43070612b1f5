//! API handlers and shared helpers.

pub mod accounts;
pub mod health;
pub mod projects;
pub mod root;

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract a bearer credential from the `Authorization` header.
///
/// Used for the project secret on signup/login requests.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
