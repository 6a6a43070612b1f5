//! Pure validation of signup/login input against a project's settings.
//!
//! Everything here is a function over `(settings, input)`; storage trusts
//! that these checks ran once before it is invoked.

use regex::Regex;

use super::super::projects::types::{PasswordPolicy, ProjectSettings};
use crate::api::error::ApiError;

// Lowercase alphanumeric segments separated by single dots or underscores;
// a leading separator cannot match because the first segment is mandatory.
const USERNAME_PATTERN: &str = r"^[a-z0-9]+(?:[._][a-z0-9]+)*$";
const EMAIL_PATTERN: &str =
    r"^[a-zA-Z0-9][a-zA-Z0-9._%+-]*[a-zA-Z0-9]@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";
const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*(),.?":{}|<>"#;

/// Which account field a login request identifies the account by.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum LoginIdentifier<'a> {
    Username(&'a str),
    Email(&'a str),
}

/// Validate a signup request against the project's settings.
///
/// # Errors
///
/// Returns `ApiError::Validation` naming the first failed rule.
pub(super) fn validate_signup(
    settings: &ProjectSettings,
    username: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> Result<(), ApiError> {
    if !valid_username(username) {
        return Err(ApiError::Validation("Username not valid".to_string()));
    }

    if !valid_email(email) {
        return Err(ApiError::Validation(
            "Invalid email format or email not present".to_string(),
        ));
    }

    validate_password(&settings.password_policy, password)?;

    if let Some(role) = role {
        validate_role(settings, role)?;
    }

    Ok(())
}

/// Validate a password against the project's password policy.
///
/// # Errors
///
/// Returns `ApiError::Validation` naming the first failed rule.
pub(super) fn validate_password(policy: &PasswordPolicy, password: &str) -> Result<(), ApiError> {
    if password.is_empty() {
        return Err(ApiError::Validation("Password is required".to_string()));
    }

    if password.chars().count() < policy.min_length {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters long",
            policy.min_length
        )));
    }

    if policy.require_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ApiError::Validation(
            "Password must contain at least one number".to_string(),
        ));
    }

    if policy.require_special_characters
        && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
    {
        return Err(ApiError::Validation(
            "Password must contain at least one special character".to_string(),
        ));
    }

    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ApiError::Validation(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    Ok(())
}

/// Check that `role` names a role configured for the project.
///
/// # Errors
///
/// Returns `ApiError::Validation` listing the configured role names.
pub(super) fn validate_role(settings: &ProjectSettings, role: &str) -> Result<(), ApiError> {
    if settings.roles.iter().any(|known| known.name == role) {
        return Ok(());
    }

    let known = settings
        .roles
        .iter()
        .map(|role| role.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ApiError::Validation(format!(
        "Invalid role. Must be one of: {known}"
    )))
}

/// Pick the login identifier allowed by the project's auth methods.
///
/// # Errors
///
/// Returns `ApiError::Validation` when no enabled method matches the request.
pub(super) fn login_identifier<'a>(
    settings: &ProjectSettings,
    username: Option<&'a str>,
    email: Option<&'a str>,
) -> Result<LoginIdentifier<'a>, ApiError> {
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        if settings.auth_methods.username_login {
            return Ok(LoginIdentifier::Username(username));
        }
    }

    if let Some(email) = email.filter(|e| !e.is_empty()) {
        if settings.auth_methods.email_login {
            return Ok(LoginIdentifier::Email(email));
        }
    }

    Err(ApiError::Validation(
        "No enabled login method matches the supplied identifier".to_string(),
    ))
}

fn valid_username(username: &str) -> bool {
    Regex::new(USERNAME_PATTERN).is_ok_and(|regex| regex.is_match(username))
}

fn valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).is_ok_and(|regex| regex.is_match(email))
}

#[cfg(test)]
mod tests {
    use super::super::super::projects::types::{AuthMethods, RoleDefinition};
    use super::*;

    fn settings_with_roles(names: &[&str]) -> ProjectSettings {
        ProjectSettings {
            roles: names
                .iter()
                .map(|name| RoleDefinition {
                    name: (*name).to_string(),
                    permissions: Vec::new(),
                })
                .collect(),
            ..ProjectSettings::default()
        }
    }

    #[test]
    fn username_accepts_dotted_lowercase() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice.b"));
        assert!(valid_username("a1_b2"));
    }

    #[test]
    fn username_rejects_bad_shapes() {
        assert!(!valid_username(""));
        assert!(!valid_username(".alice"));
        assert!(!valid_username("_alice"));
        assert!(!valid_username("alice."));
        assert!(!valid_username("ali..ce"));
        assert!(!valid_username("Alice"));
        assert!(!valid_username("al ice"));
    }

    #[test]
    fn email_basic_shapes() {
        assert!(valid_email("alice@x.com"));
        assert!(valid_email("a.b+tag@sub.example.co"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-domain@"));
        assert!(!valid_email("@example.com"));
    }

    #[test]
    fn password_policy_min_length() {
        let policy = PasswordPolicy {
            min_length: 10,
            ..PasswordPolicy::default()
        };
        assert!(validate_password(&policy, "short").is_err());
        assert!(validate_password(&policy, "long-enough").is_ok());
    }

    #[test]
    fn password_policy_empty_is_required() {
        let policy = PasswordPolicy::default();
        let err = validate_password(&policy, "").unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "Password is required"));
    }

    #[test]
    fn password_policy_character_classes() {
        let policy = PasswordPolicy {
            min_length: 4,
            require_numbers: true,
            require_special_characters: true,
            require_uppercase: true,
        };
        assert!(validate_password(&policy, "abcdef").is_err());
        assert!(validate_password(&policy, "abcdef1").is_err());
        assert!(validate_password(&policy, "abcdef1!").is_err());
        assert!(validate_password(&policy, "Abcdef1!").is_ok());
    }

    #[test]
    fn signup_passes_with_valid_input() {
        let settings = settings_with_roles(&["admin", "viewer"]);
        assert!(validate_signup(
            &settings,
            "alice",
            "alice@x.com",
            "Str0ng!Pw",
            Some("viewer")
        )
        .is_ok());
    }

    #[test]
    fn signup_rejects_unknown_role() {
        let settings = settings_with_roles(&["admin", "viewer"]);
        let err = validate_signup(&settings, "alice", "alice@x.com", "Str0ng!Pw", Some("root"))
            .unwrap_err();
        assert!(
            matches!(err, ApiError::Validation(ref m) if m == "Invalid role. Must be one of: admin, viewer")
        );
    }

    #[test]
    fn signup_without_role_skips_membership_check() {
        let settings = settings_with_roles(&[]);
        assert!(validate_signup(&settings, "alice", "alice@x.com", "Str0ng!Pw", None).is_ok());
    }

    #[test]
    fn login_identifier_follows_auth_methods() {
        let username_only = ProjectSettings::default();
        assert_eq!(
            login_identifier(&username_only, Some("alice"), None).unwrap(),
            LoginIdentifier::Username("alice")
        );
        assert!(login_identifier(&username_only, None, Some("alice@x.com")).is_err());

        let email_only = ProjectSettings {
            auth_methods: AuthMethods {
                email_login: true,
                username_login: false,
            },
            ..ProjectSettings::default()
        };
        assert_eq!(
            login_identifier(&email_only, None, Some("alice@x.com")).unwrap(),
            LoginIdentifier::Email("alice@x.com")
        );
        assert!(login_identifier(&email_only, Some("alice"), None).is_err());
    }

    #[test]
    fn login_identifier_prefers_username_when_both_given() {
        let both = ProjectSettings {
            auth_methods: AuthMethods {
                email_login: true,
                username_login: true,
            },
            ..ProjectSettings::default()
        };
        assert_eq!(
            login_identifier(&both, Some("alice"), Some("alice@x.com")).unwrap(),
            LoginIdentifier::Username("alice")
        );
    }
}
