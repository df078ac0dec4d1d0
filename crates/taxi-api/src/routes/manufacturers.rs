//! # Manufacturers
//!
//! ## Endpoints
//!
//! - `GET /manufacturers`: list, searchable by `name`
//! - `POST /manufacturers`: create
//! - `GET /manufacturers/{id}`: detail
//! - `PUT /manufacturers/{id}`: update
//! - `DELETE /manufacturers/{id}`: delete, together with its cars

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use taxi_core::{Manufacturer, ManufacturerForm, ManufacturerId, PageMeta};
use utoipa::ToSchema;

use crate::auth::CurrentDriver;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::fleet;
use crate::listing::{list_page, ListContext, ListParams};
use crate::state::AppState;

// ── Response DTOs ───────────────────────────────────────────────────

/// Echo of the manufacturer search input.
#[derive(Debug, Serialize, ToSchema)]
pub struct ManufacturerSearchForm {
    pub name: String,
}

/// One page of manufacturers.
#[derive(Debug, Serialize, ToSchema)]
pub struct ManufacturerList {
    pub manufacturer_list: Vec<Manufacturer>,
    pub is_paginated: bool,
    pub page_obj: PageMeta,
    pub search_form: ManufacturerSearchForm,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/manufacturers",
            get(list_manufacturers).post(create_manufacturer),
        )
        .route(
            "/manufacturers/{id}",
            get(get_manufacturer)
                .put(update_manufacturer)
                .delete(delete_manufacturer),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /manufacturers: Search and paginate manufacturers.
#[utoipa::path(
    get,
    path = "/manufacturers",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = 200, description = "One page of manufacturers", body = ManufacturerList),
        (status = 401, description = "Not logged in", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "manufacturers"
)]
pub async fn list_manufacturers(
    State(state): State<AppState>,
    _current: CurrentDriver,
    params: ListParams,
) -> Json<ManufacturerList> {
    let ctx = ListContext::from(list_page(state.manufacturers.list(), &params));
    Json(ManufacturerList {
        manufacturer_list: ctx.records,
        is_paginated: ctx.is_paginated,
        page_obj: ctx.page_obj,
        search_form: ManufacturerSearchForm {
            name: params.search::<Manufacturer>().to_string(),
        },
    })
}

/// POST /manufacturers: Create a manufacturer.
#[utoipa::path(
    post,
    path = "/manufacturers",
    request_body = ManufacturerForm,
    responses(
        (status = 201, description = "Manufacturer created", body = Manufacturer),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "manufacturers"
)]
pub async fn create_manufacturer(
    State(state): State<AppState>,
    _current: CurrentDriver,
    body: Result<Json<ManufacturerForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Manufacturer>), AppError> {
    let form = extract_json(body)?;
    let manufacturer = fleet::create_manufacturer(&state, form)?;
    Ok((StatusCode::CREATED, Json(manufacturer)))
}

/// GET /manufacturers/{id}: Get a single manufacturer.
#[utoipa::path(
    get,
    path = "/manufacturers/{id}",
    params(("id" = u64, Path, description = "Manufacturer ID")),
    responses(
        (status = 200, description = "Manufacturer found", body = Manufacturer),
        (status = 404, description = "Manufacturer not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "manufacturers"
)]
pub async fn get_manufacturer(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<ManufacturerId>, PathRejection>,
) -> Result<Json<Manufacturer>, AppError> {
    let id = extract_path(path)?;
    state
        .manufacturers
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::not_found("manufacturer", id))
}

/// PUT /manufacturers/{id}: Update a manufacturer.
#[utoipa::path(
    put,
    path = "/manufacturers/{id}",
    params(("id" = u64, Path, description = "Manufacturer ID")),
    request_body = ManufacturerForm,
    responses(
        (status = 200, description = "Manufacturer updated", body = Manufacturer),
        (status = 404, description = "Manufacturer not found", body = crate::error::ErrorBody),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "manufacturers"
)]
pub async fn update_manufacturer(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<ManufacturerId>, PathRejection>,
    body: Result<Json<ManufacturerForm>, JsonRejection>,
) -> Result<Json<Manufacturer>, AppError> {
    let id = extract_path(path)?;
    let form = extract_json(body)?;
    fleet::update_manufacturer(&state, id, form).map(Json)
}

/// DELETE /manufacturers/{id}: Delete a manufacturer and its cars.
#[utoipa::path(
    delete,
    path = "/manufacturers/{id}",
    params(("id" = u64, Path, description = "Manufacturer ID")),
    responses(
        (status = 204, description = "Manufacturer and its cars deleted"),
        (status = 404, description = "Manufacturer not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "manufacturers"
)]
pub async fn delete_manufacturer(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<ManufacturerId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(path)?;
    fleet::delete_manufacturer(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}
