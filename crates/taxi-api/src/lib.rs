//! # taxi-api: Axum API Service for the Taxi Fleet
//!
//! Manages manufacturers, cars and the drivers assigned to them. Every list
//! endpoint supports a case-insensitive substring search and pages of
//! [`taxi_core::PAGE_SIZE`] records. Responses are JSON context documents.
//!
//! ## API Surface
//!
//! | Prefix              | Module                       | Auth    |
//! |---------------------|------------------------------|---------|
//! | `/`                 | [`routes::index`]            | session |
//! | `/manufacturers/*`  | [`routes::manufacturers`]    | session |
//! | `/cars/*`           | [`routes::cars`]             | session |
//! | `/drivers/*`        | [`routes::drivers`]          | session |
//! | `/accounts/logout`  | [`routes::accounts`]         | session |
//! | `/accounts/login`   | [`routes::accounts`]         | none    |
//! | `/openapi.json`     | [`openapi`]                  | none    |
//! | `/metrics`          | [`middleware::metrics`]      | none    |
//! | `/health/*`         | probes                       | none    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware (session routes only) → Handler
//! ```

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod fleet;
pub mod listing;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

pub use crate::error::AppError;
pub use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Login, health probes, the OpenAPI document and `/metrics` are mounted
/// outside the auth middleware so they remain accessible without a session.
pub fn app(state: AppState) -> Router {
    // Session-protected routes.
    let protected = Router::new()
        .merge(routes::index::router())
        .merge(routes::manufacturers::router())
        .merge(routes::cars::router())
        .merge(routes::drivers::router())
        .merge(routes::accounts::router())
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    let public = Router::new()
        .merge(routes::accounts::public_router())
        .merge(openapi::router())
        .route("/metrics", get(middleware::metrics::render))
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe. Always 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe. The stores are in memory, so ready as soon as serving.
async fn readiness() -> &'static str {
    "ready"
}
