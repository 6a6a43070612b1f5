//! OpenAPI document for the service.
//!
//! Handlers carry `#[utoipa::path]` annotations; this module collects them
//! into one spec served at `/openapi.json`.

use utoipa::OpenApi;

use super::handlers::{accounts, health, projects};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        projects::register,
        projects::rotate_secret,
        projects::revoke_credentials,
        projects::soft_delete,
        accounts::signup,
        accounts::login,
        accounts::tokens::refresh,
        accounts::tokens::revoke,
        accounts::tokens::revoke_all,
    ),
    components(schemas(
        health::Health,
        projects::types::RegisterProjectRequest,
        projects::types::ProjectDetails,
        projects::types::ProjectSettings,
        projects::types::RoleDefinition,
        projects::types::AuthMethods,
        projects::types::SocialLogin,
        projects::types::PasswordPolicy,
        projects::types::ProjectResponse,
        projects::types::ProjectCredentials,
        projects::types::RegisterProjectResponse,
        projects::types::OwnerRequest,
        projects::types::RotateSecretResponse,
        accounts::types::SignupRequest,
        accounts::types::AccountResponse,
        accounts::types::LoginRequest,
        accounts::types::TokenPairResponse,
        accounts::types::RefreshRequest,
        accounts::types::RevokeRequest,
    )),
    tags(
        (name = "projects", description = "Tenant registration and credential lifecycle"),
        (name = "accounts", description = "Project-scoped account signup and login"),
        (name = "tokens", description = "Refresh-token rotation and revocation"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

/// Build the OpenAPI document.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
