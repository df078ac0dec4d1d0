//! # Drivers
//!
//! ## Endpoints
//!
//! - `GET /drivers`: list, searchable by `username`
//! - `POST /drivers`: register a driver
//! - `GET /drivers/{id}`: detail with assigned cars
//! - `PUT /drivers/{id}/license`: change the license number
//! - `DELETE /drivers/{id}`: delete
//!
//! Drivers are user accounts; other profile fields are fixed after
//! registration.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Serialize;
use taxi_core::{Driver, DriverCreationForm, DriverId, DriverLicenseUpdateForm, PageMeta};
use utoipa::ToSchema;

use crate::auth::CurrentDriver;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::fleet;
use crate::listing::{list_page, ListContext, ListParams};
use crate::routes::CarSummary;
use crate::state::AppState;

// ── Response DTOs ───────────────────────────────────────────────────

/// Echo of the driver search input.
#[derive(Debug, Serialize, ToSchema)]
pub struct DriverSearchForm {
    pub username: String,
}

/// One page of drivers.
#[derive(Debug, Serialize, ToSchema)]
pub struct DriverList {
    pub driver_list: Vec<Driver>,
    pub is_paginated: bool,
    pub page_obj: PageMeta,
    pub search_form: DriverSearchForm,
}

/// A driver with the cars assigned to them.
#[derive(Debug, Serialize, ToSchema)]
pub struct DriverDetail {
    pub driver: Driver,
    /// First and last name, empty when neither is set.
    pub full_name: String,
    pub cars: Vec<CarSummary>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/drivers", get(list_drivers).post(create_driver))
        .route("/drivers/{id}", get(get_driver).delete(delete_driver))
        .route("/drivers/{id}/license", put(update_license))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /drivers: Search and paginate drivers.
#[utoipa::path(
    get,
    path = "/drivers",
    params(
        ("username" = Option<String>, Query, description = "Case-insensitive substring of the username"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = 200, description = "One page of drivers", body = DriverList),
        (status = 401, description = "Not logged in", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "drivers"
)]
pub async fn list_drivers(
    State(state): State<AppState>,
    _current: CurrentDriver,
    params: ListParams,
) -> Json<DriverList> {
    let ctx = ListContext::from(list_page(state.drivers.list(), &params));
    Json(DriverList {
        driver_list: ctx.records,
        is_paginated: ctx.is_paginated,
        page_obj: ctx.page_obj,
        search_form: DriverSearchForm {
            username: params.search::<Driver>().to_string(),
        },
    })
}

/// POST /drivers: Register a driver.
#[utoipa::path(
    post,
    path = "/drivers",
    request_body = DriverCreationForm,
    responses(
        (status = 201, description = "Driver created", body = Driver),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "drivers"
)]
pub async fn create_driver(
    State(state): State<AppState>,
    _current: CurrentDriver,
    body: Result<Json<DriverCreationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Driver>), AppError> {
    let form = extract_json(body)?;
    let driver = fleet::create_driver(&state, form)?;
    Ok((StatusCode::CREATED, Json(driver)))
}

/// GET /drivers/{id}: Driver with assigned cars.
#[utoipa::path(
    get,
    path = "/drivers/{id}",
    params(("id" = u64, Path, description = "Driver ID")),
    responses(
        (status = 200, description = "Driver found", body = DriverDetail),
        (status = 404, description = "Driver not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "drivers"
)]
pub async fn get_driver(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<DriverId>, PathRejection>,
) -> Result<Json<DriverDetail>, AppError> {
    let id = extract_path(path)?;
    let manufacturers = state.manufacturers.read();
    let cars = state.cars.read();
    let drivers = state.drivers.read();

    let driver = drivers
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::not_found("driver", id))?;
    let cars = cars
        .values()
        .filter(|car| car.has_driver(id))
        .filter_map(|car| CarSummary::resolve(car.clone(), &manufacturers))
        .collect();

    Ok(Json(DriverDetail {
        full_name: driver.full_name(),
        driver,
        cars,
    }))
}

/// PUT /drivers/{id}/license: Change a driver's license number.
#[utoipa::path(
    put,
    path = "/drivers/{id}/license",
    params(("id" = u64, Path, description = "Driver ID")),
    request_body = DriverLicenseUpdateForm,
    responses(
        (status = 200, description = "License updated", body = Driver),
        (status = 404, description = "Driver not found", body = crate::error::ErrorBody),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "drivers"
)]
pub async fn update_license(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<DriverId>, PathRejection>,
    body: Result<Json<DriverLicenseUpdateForm>, JsonRejection>,
) -> Result<Json<Driver>, AppError> {
    let id = extract_path(path)?;
    let form = extract_json(body)?;
    fleet::update_license(&state, id, form).map(Json)
}

/// DELETE /drivers/{id}: Delete a driver.
#[utoipa::path(
    delete,
    path = "/drivers/{id}",
    params(("id" = u64, Path, description = "Driver ID")),
    responses(
        (status = 204, description = "Driver deleted and unassigned from all cars"),
        (status = 404, description = "Driver not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "drivers"
)]
pub async fn delete_driver(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<DriverId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(path)?;
    fleet::delete_driver(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}
