//! # hcred-api — Axum API service for the healthcred stack
//!
//! The orchestration layer above the two external collaborators: the
//! credential ledger contract (via `hcred-ledger`) and the pinning
//! service/gateway (via `hcred-ipfs`). Provides credential issuance,
//! revocation, reconciliation, the decorative ledger view, a profile
//! registry, and a public verification endpoint.
//!
//! ## API Surface
//!
//! | Prefix               | Module                  | Auth |
//! |----------------------|-------------------------|------|
//! | `/v1/credentials/*`  | [`routes::credentials`] | yes  |
//! | `/v1/profiles/*`     | [`routes::profiles`]    | yes  |
//! | `/v1/verify/*`       | [`routes::verify`]      | no   |
//! | `/health/*`          | liveness/readiness      | no   |
//! | `/openapi.json`      | [`openapi`]             | yes  |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → CorsLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod issuance;
pub mod ledger_view;
pub mod openapi;
pub mod revocation;
pub mod routes;
pub mod state;
pub mod verification;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// The public verification endpoint and the health probes are mounted
/// outside the auth middleware so they remain accessible without
/// credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::credentials::router())
        .merge(routes::profiles::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated routes: public verification + health probes.
    let public = Router::new()
        .merge(routes::verify::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(public).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
