//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec.
//! Serves at `/openapi.json` without authentication.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taxi Service API",
        version = "0.1.0",
        description = "Manufacturers, cars and drivers of a taxi fleet, with searchable paginated lists and bearer-token sessions.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Home
        crate::routes::index::index,
        // Accounts
        crate::routes::accounts::login,
        crate::routes::accounts::logout,
        // Manufacturers
        crate::routes::manufacturers::list_manufacturers,
        crate::routes::manufacturers::create_manufacturer,
        crate::routes::manufacturers::get_manufacturer,
        crate::routes::manufacturers::update_manufacturer,
        crate::routes::manufacturers::delete_manufacturer,
        // Cars
        crate::routes::cars::list_cars,
        crate::routes::cars::create_car,
        crate::routes::cars::get_car,
        crate::routes::cars::update_car,
        crate::routes::cars::delete_car,
        crate::routes::cars::toggle_assign,
        // Drivers
        crate::routes::drivers::list_drivers,
        crate::routes::drivers::create_driver,
        crate::routes::drivers::get_driver,
        crate::routes::drivers::update_license,
        crate::routes::drivers::delete_driver,
    ),
    components(schemas(
        // Records
        taxi_core::Manufacturer,
        taxi_core::Car,
        taxi_core::Driver,
        taxi_core::ManufacturerId,
        taxi_core::CarId,
        taxi_core::DriverId,
        taxi_core::LicenseNumber,
        taxi_core::PageMeta,
        // Forms
        taxi_core::ManufacturerForm,
        taxi_core::CarForm,
        taxi_core::DriverCreationForm,
        taxi_core::DriverLicenseUpdateForm,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Response DTOs
        crate::routes::CarSummary,
        crate::routes::index::IndexContext,
        crate::routes::accounts::LoginRequest,
        crate::routes::accounts::LoginResponse,
        crate::routes::manufacturers::ManufacturerList,
        crate::routes::manufacturers::ManufacturerSearchForm,
        crate::routes::cars::CarList,
        crate::routes::cars::CarSearchForm,
        crate::routes::cars::CarDetail,
        crate::routes::cars::AssignmentStatus,
        crate::routes::drivers::DriverList,
        crate::routes::drivers::DriverSearchForm,
        crate::routes::drivers::DriverDetail,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "home", description = "Fleet overview"),
        (name = "accounts", description = "Login and logout"),
        (name = "manufacturers", description = "Car manufacturers"),
        (name = "cars", description = "Cars and driver assignment"),
        (name = "drivers", description = "Driver accounts and licenses"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the handlers.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
