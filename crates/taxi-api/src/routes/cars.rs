//! # Cars
//!
//! ## Endpoints
//!
//! - `GET /cars`: list, searchable by `model`
//! - `POST /cars`: create
//! - `GET /cars/{id}`: detail with manufacturer and drivers
//! - `PUT /cars/{id}`: update
//! - `DELETE /cars/{id}`: delete
//! - `POST /cars/{id}/toggle-assign`: assign or unassign the current driver

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use taxi_core::{Car, CarForm, CarId, Driver, DriverId, Manufacturer, PageMeta};
use utoipa::ToSchema;

use crate::auth::CurrentDriver;
use crate::error::AppError;
use crate::extractors::{extract_json, extract_path};
use crate::fleet;
use crate::listing::{list_page, ListContext, ListParams};
use crate::routes::CarSummary;
use crate::state::AppState;

// ── Response DTOs ───────────────────────────────────────────────────

/// Echo of the car search input.
#[derive(Debug, Serialize, ToSchema)]
pub struct CarSearchForm {
    pub model: String,
}

/// One page of cars.
#[derive(Debug, Serialize, ToSchema)]
pub struct CarList {
    pub car_list: Vec<CarSummary>,
    pub is_paginated: bool,
    pub page_obj: PageMeta,
    pub search_form: CarSearchForm,
}

/// A car with everything its detail page shows.
#[derive(Debug, Serialize, ToSchema)]
pub struct CarDetail {
    pub car: Car,
    pub manufacturer: Manufacturer,
    /// Assigned drivers in assignment order.
    pub drivers: Vec<Driver>,
    /// Whether the logged-in driver is among `drivers`.
    pub assigned_to_current_driver: bool,
}

/// Outcome of a toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentStatus {
    pub car: CarId,
    pub driver: DriverId,
    pub assigned: bool,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route(
            "/cars/{id}",
            get(get_car).put(update_car).delete(delete_car),
        )
        .route("/cars/{id}/toggle-assign", post(toggle_assign))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /cars: Search and paginate cars.
#[utoipa::path(
    get,
    path = "/cars",
    params(
        ("model" = Option<String>, Query, description = "Case-insensitive substring of the model"),
        ("page" = Option<String>, Query, description = "Page number or `last`"),
    ),
    responses(
        (status = 200, description = "One page of cars", body = CarList),
        (status = 401, description = "Not logged in", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn list_cars(
    State(state): State<AppState>,
    _current: CurrentDriver,
    params: ListParams,
) -> Json<CarList> {
    // Manufacturers stay locked while the cars are read, so every listed car
    // resolves.
    let manufacturers = state.manufacturers.read();
    let cars = state.cars.read().values().cloned().collect();
    let ctx = ListContext::from(list_page(cars, &params));
    let car_list = ctx
        .records
        .into_iter()
        .filter_map(|car| CarSummary::resolve(car, &manufacturers))
        .collect();

    Json(CarList {
        car_list,
        is_paginated: ctx.is_paginated,
        page_obj: ctx.page_obj,
        search_form: CarSearchForm {
            model: params.search::<Car>().to_string(),
        },
    })
}

/// POST /cars: Create a car.
#[utoipa::path(
    post,
    path = "/cars",
    request_body = CarForm,
    responses(
        (status = 201, description = "Car created", body = Car),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn create_car(
    State(state): State<AppState>,
    _current: CurrentDriver,
    body: Result<Json<CarForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    let form = extract_json(body)?;
    let car = fleet::create_car(&state, form)?;
    Ok((StatusCode::CREATED, Json(car)))
}

/// GET /cars/{id}: Car with its manufacturer and drivers.
#[utoipa::path(
    get,
    path = "/cars/{id}",
    params(("id" = u64, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Car found", body = CarDetail),
        (status = 404, description = "Car not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn get_car(
    State(state): State<AppState>,
    current: CurrentDriver,
    path: Result<Path<CarId>, PathRejection>,
) -> Result<Json<CarDetail>, AppError> {
    let id = extract_path(path)?;
    let manufacturers = state.manufacturers.read();
    let cars = state.cars.read();
    let drivers = state.drivers.read();

    let car = cars.get(id).ok_or_else(|| AppError::not_found("car", id))?;
    let manufacturer = manufacturers.get(car.manufacturer).cloned().ok_or_else(|| {
        AppError::Internal(format!("car {id} references missing manufacturer"))
    })?;
    let assigned: Vec<Driver> = car
        .drivers
        .iter()
        .filter_map(|d| drivers.get(*d).cloned())
        .collect();

    Ok(Json(CarDetail {
        assigned_to_current_driver: car.has_driver(current.driver.id),
        car: car.clone(),
        manufacturer,
        drivers: assigned,
    }))
}

/// PUT /cars/{id}: Update a car.
#[utoipa::path(
    put,
    path = "/cars/{id}",
    params(("id" = u64, Path, description = "Car ID")),
    request_body = CarForm,
    responses(
        (status = 200, description = "Car updated", body = Car),
        (status = 404, description = "Car not found", body = crate::error::ErrorBody),
        (status = 422, description = "Form rejected", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn update_car(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<CarId>, PathRejection>,
    body: Result<Json<CarForm>, JsonRejection>,
) -> Result<Json<Car>, AppError> {
    let id = extract_path(path)?;
    let form = extract_json(body)?;
    fleet::update_car(&state, id, form).map(Json)
}

/// DELETE /cars/{id}: Delete a car.
#[utoipa::path(
    delete,
    path = "/cars/{id}",
    params(("id" = u64, Path, description = "Car ID")),
    responses(
        (status = 204, description = "Car deleted"),
        (status = 404, description = "Car not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn delete_car(
    State(state): State<AppState>,
    _current: CurrentDriver,
    path: Result<Path<CarId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_path(path)?;
    fleet::delete_car(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /cars/{id}/toggle-assign: Add or remove the current driver.
#[utoipa::path(
    post,
    path = "/cars/{id}/toggle-assign",
    params(("id" = u64, Path, description = "Car ID")),
    responses(
        (status = 200, description = "Assignment toggled", body = AssignmentStatus),
        (status = 404, description = "Car not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "cars"
)]
pub async fn toggle_assign(
    State(state): State<AppState>,
    current: CurrentDriver,
    path: Result<Path<CarId>, PathRejection>,
) -> Result<Json<AssignmentStatus>, AppError> {
    let id = extract_path(path)?;
    let driver = current.driver.id;
    let assigned = fleet::toggle_assignment(&state, id, driver)?;
    Ok(Json(AssignmentStatus {
        car: id,
        driver,
        assigned,
    }))
}
