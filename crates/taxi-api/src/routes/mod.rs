//! # API Route Modules
//!
//! - `index`: home page counters.
//! - `accounts`: login and logout.
//! - `manufacturers`, `cars`, `drivers`: searchable paginated lists and
//!   the create, detail, update and delete operations of each record kind.
//!
//! Everything except login sits behind the auth middleware.

pub mod accounts;
pub mod cars;
pub mod drivers;
pub mod index;
pub mod manufacturers;

use serde::Serialize;
use taxi_core::{Car, CarId, DriverId, Manufacturer, ManufacturerId};
use utoipa::ToSchema;

use crate::state::Records;

/// A car with its manufacturer resolved, as shown in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CarSummary {
    pub id: CarId,
    pub model: String,
    pub manufacturer: Manufacturer,
    pub drivers: Vec<DriverId>,
}

impl CarSummary {
    /// Resolve `car`'s manufacturer. `None` only if the manufacturer is gone,
    /// which the cascade on delete rules out.
    pub fn resolve(car: Car, manufacturers: &Records<ManufacturerId, Manufacturer>) -> Option<Self> {
        let manufacturer = manufacturers.get(car.manufacturer)?.clone();
        Some(Self {
            id: car.id,
            model: car.model,
            manufacturer,
            drivers: car.drivers,
        })
    }
}
