//! HTTP server wiring: database pool, middleware stack, and routes.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::{Extension, MatchedPath},
    http::{HeaderName, HeaderValue, Request},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

use crate::{cli::globals::GlobalArgs, token::TokenKeys};

pub mod error;
pub(crate) mod handlers;
mod openapi;

pub use openapi::openapi;

/// Shared per-process state handed to handlers as an `Extension`.
pub struct AppContext {
    pub token_keys: TokenKeys,
    pub secret_hash_cost: u32,
}

/// Start the server
///
/// # Errors
///
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let context = Arc::new(AppContext {
        token_keys: globals.token_keys(),
        secret_hash_cost: globals.secret_hash_cost,
    });

    let app = router()
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(context))
                .layer(Extension(pool.clone())),
        )
        .layer(Extension(pool));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Build the application router. Kept separate from [`new`] so tests can
/// exercise routing without binding a socket.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::health::health))
        .route("/openapi.json", get(openapi_json))
        .route("/v1/projects", post(handlers::projects::register))
        .route("/v1/projects/:uid", delete(handlers::projects::soft_delete))
        .route(
            "/v1/projects/:uid/secret",
            post(handlers::projects::rotate_secret).delete(handlers::projects::revoke_credentials),
        )
        .route(
            "/v1/projects/:uid/accounts",
            post(handlers::accounts::signup),
        )
        .route(
            "/v1/projects/:uid/accounts/login",
            post(handlers::accounts::login),
        )
        .route(
            "/v1/tokens/refresh",
            post(handlers::accounts::tokens::refresh),
        )
        .route("/v1/tokens/revoke", post(handlers::accounts::tokens::revoke))
        .route(
            "/v1/tokens/revoke-all",
            post(handlers::accounts::tokens::revoke_all),
        )
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
