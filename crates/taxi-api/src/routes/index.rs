//! # Home
//!
//! `GET /`: record counts and the per-session visit counter.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::CurrentDriver;
use crate::error::AppError;
use crate::state::AppState;

/// Home page context.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexContext {
    pub num_drivers: usize,
    pub num_cars: usize,
    pub num_manufacturers: usize,
    /// Home page visits in this session, this one included.
    pub num_visits: u64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

/// GET /: Fleet counts and session visit counter.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home page context", body = IndexContext),
        (status = 401, description = "Not logged in", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "home"
)]
pub async fn index(
    State(state): State<AppState>,
    current: CurrentDriver,
) -> Result<Json<IndexContext>, AppError> {
    let num_visits = state
        .sessions
        .record_visit(&current.session)
        .ok_or_else(|| AppError::Unauthorized("session ended during request".into()))?;

    Ok(Json(IndexContext {
        num_drivers: state.drivers.len(),
        num_cars: state.cars.len(),
        num_manufacturers: state.manufacturers.len(),
        num_visits,
    }))
}
