//! # acm-api — Arcade Compliance Manager HTTP Service
//!
//! Axum service over the machine registry. Compliance is never stored:
//! each response that reports it re-evaluates the arcade's current active
//! machines through `acm-compliance`.
//!
//! ## API Surface
//!
//! | Prefix                   | Module                         | Domain                |
//! |--------------------------|--------------------------------|-----------------------|
//! | `/v1/organizations/*`    | [`routes::organizations`]      | Operator organizations |
//! | `/v1/arcades/*`          | [`routes::arcades`]            | Arcade premises       |
//! | `/v1/arcades/{id}/machines`, `/v1/machines/*` | [`routes::machines`] | Machine registry |
//! | `/v1/compliance/*`, `/v1/arcades/{id}/compliance` | [`routes::compliance`] | B3 quota checks |
//! | `/openapi.json`          | [`openapi`]                    | API description       |
//! | `/metrics`               | [`middleware::metrics`]        | Prometheus exposition |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod registry;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::auth::AuthConfig;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the auth
/// middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::organizations::router())
        .merge(routes::arcades::router())
        .merge(routes::machines::router())
        .merge(routes::compliance::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(auth_config))
        .with_state(state.clone());

    // Unauthenticated probes and scrape endpoint.
    let public = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(middleware::metrics::render))
        .with_state(state);

    Router::new().merge(public).merge(api)
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
