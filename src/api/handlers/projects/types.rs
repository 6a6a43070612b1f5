//! Request/response types for the project (tenant) API.
//!
//! `ProjectSettings` is the per-tenant policy document persisted as `jsonb`;
//! its defaults match what a freshly registered project receives when the
//! caller supplies no settings at all.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000";
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterProjectRequest {
    pub owner_id: String,
    pub details: ProjectDetails,
    #[serde(default)]
    pub settings: ProjectSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectDetails {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectSettings {
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    #[serde(default)]
    pub auth_methods: AuthMethods,
    #[serde(default)]
    pub social_login: SocialLogin,
    #[serde(default)]
    pub password_policy: PasswordPolicy,
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    pub auth_url: Option<String>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            roles: Vec::new(),
            auth_methods: AuthMethods::default(),
            social_login: SocialLogin::default(),
            password_policy: PasswordPolicy::default(),
            redirect_url: default_redirect_url(),
            auth_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleDefinition {
    pub name: String,
    // Stored for the tenant's own use; never evaluated by this service.
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthMethods {
    #[serde(default)]
    pub email_login: bool,
    #[serde(default = "default_true")]
    pub username_login: bool,
}

impl Default for AuthMethods {
    fn default() -> Self {
        Self {
            email_login: false,
            username_login: true,
        }
    }
}

/// Informational flags only; no social-login flow is implemented.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SocialLogin {
    #[serde(default)]
    pub google: bool,
    #[serde(default)]
    pub github: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordPolicy {
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    #[serde(default)]
    pub require_numbers: bool,
    #[serde(default)]
    pub require_special_characters: bool,
    #[serde(default)]
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            require_numbers: false,
            require_special_characters: false,
            require_uppercase: false,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub uid: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub settings: ProjectSettings,
    pub status: String,
    pub created_at: String,
}

/// One-time credentials: the secret is returned here and never again.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectCredentials {
    pub project_uid: String,
    pub project_secret: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterProjectResponse {
    pub project: ProjectResponse,
    pub credentials: ProjectCredentials,
}

/// Owner reference for management operations (rotate/revoke/delete).
#[derive(Debug, Deserialize, ToSchema)]
pub struct OwnerRequest {
    pub owner_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RotateSecretResponse {
    pub project_uid: String,
    pub project_secret: String,
}

fn default_redirect_url() -> String {
    DEFAULT_REDIRECT_URL.to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_min_length() -> usize {
    DEFAULT_MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_matches_fresh_project() {
        let settings = ProjectSettings::default();
        assert!(settings.roles.is_empty());
        assert!(!settings.auth_methods.email_login);
        assert!(settings.auth_methods.username_login);
        assert!(!settings.social_login.google);
        assert!(!settings.social_login.github);
        assert_eq!(
            settings.password_policy.min_length,
            DEFAULT_MIN_PASSWORD_LENGTH
        );
        assert_eq!(settings.redirect_url, DEFAULT_REDIRECT_URL);
        assert!(settings.auth_url.is_none());
    }

    #[test]
    fn settings_deserialize_fills_defaults() {
        let settings: ProjectSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.auth_methods.username_login);
        assert_eq!(settings.redirect_url, DEFAULT_REDIRECT_URL);
        assert_eq!(
            settings.password_policy.min_length,
            DEFAULT_MIN_PASSWORD_LENGTH
        );
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = ProjectSettings {
            roles: vec![RoleDefinition {
                name: "editor".to_string(),
                permissions: vec!["posts:write".to_string()],
            }],
            auth_methods: AuthMethods {
                email_login: true,
                username_login: false,
            },
            password_policy: PasswordPolicy {
                min_length: 12,
                require_numbers: true,
                require_special_characters: true,
                require_uppercase: true,
            },
            ..ProjectSettings::default()
        };

        let encoded = serde_json::to_string(&settings).unwrap();
        let decoded: ProjectSettings = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.roles.len(), 1);
        assert_eq!(decoded.roles[0].name, "editor");
        assert!(decoded.auth_methods.email_login);
        assert!(!decoded.auth_methods.username_login);
        assert_eq!(decoded.password_policy.min_length, 12);
    }

    #[test]
    fn register_request_accepts_minimal_payload() {
        let request: RegisterProjectRequest = serde_json::from_str(
            r#"{"owner_id": "owner-1", "details": {"name": "acme", "description": null, "logo_url": null}}"#,
        )
        .unwrap();
        assert_eq!(request.owner_id, "owner-1");
        assert_eq!(request.details.name, "acme");
        assert!(request.settings.auth_methods.username_login);
    }
}
