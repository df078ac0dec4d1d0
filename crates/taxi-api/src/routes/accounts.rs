//! # Accounts
//!
//! - `POST /accounts/login`: exchange a username and password for a bearer
//!   token (unauthenticated)
//! - `POST /accounts/logout`: end the current session

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use taxi_core::Driver;
use utoipa::ToSchema;

use crate::auth::{authenticate, CurrentDriver};
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Login credentials.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A newly opened session.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the `Authorization` header. Shown only once.
    pub token: String,
    pub driver: Driver,
}

// ── Router ──────────────────────────────────────────────────────────

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new().route("/accounts/login", post(login))
}

/// Routes that need a session.
pub fn router() -> Router<AppState> {
    Router::new().route("/accounts/logout", post(logout))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /accounts/login: Open a session.
#[utoipa::path(
    post,
    path = "/accounts/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Wrong username or password", body = crate::error::ErrorBody),
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let req = extract_json(body)?;
    let driver = authenticate(&state, &req.username, &req.password)?;
    let token = state.sessions.create(driver.id);
    tracing::info!(driver = %driver.id, "driver logged in");
    Ok(Json(LoginResponse {
        token: token.expose().to_string(),
        driver,
    }))
}

/// POST /accounts/logout: End the current session.
#[utoipa::path(
    post,
    path = "/accounts/logout",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not logged in", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "accounts"
)]
pub async fn logout(State(state): State<AppState>, current: CurrentDriver) -> StatusCode {
    state.sessions.end(&current.session);
    tracing::info!(driver = %current.driver.id, "driver logged out");
    StatusCode::NO_CONTENT
}
