//! # Fleet Records
//!
//! The three record kinds the service manages. Records are built from
//! validated forms (see [`crate::forms`]) and stored by the API layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::identity::{CarId, DriverId, ManufacturerId};
use crate::license::LicenseNumber;
use crate::search::Searchable;

/// A car manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Manufacturer {
    pub id: ManufacturerId,
    pub name: String,
    pub country: String,
}

/// A car in the fleet. Many cars share one manufacturer; each car may be
/// assigned to any number of drivers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Car {
    pub id: CarId,
    pub model: String,
    pub manufacturer: ManufacturerId,
    /// Assigned drivers, without duplicates, in assignment order.
    pub drivers: Vec<DriverId>,
}

impl Car {
    /// Whether `driver` is assigned to this car.
    pub fn has_driver(&self, driver: DriverId) -> bool {
        self.drivers.contains(&driver)
    }

    /// Assign `driver` unless already assigned. Returns `true` if added.
    pub fn assign(&mut self, driver: DriverId) -> bool {
        if self.has_driver(driver) {
            return false;
        }
        self.drivers.push(driver);
        true
    }

    /// Remove `driver` from the assignments. Returns `true` if it was present.
    pub fn unassign(&mut self, driver: DriverId) -> bool {
        let before = self.drivers.len();
        self.drivers.retain(|d| *d != driver);
        self.drivers.len() != before
    }

    /// Assign `driver` if absent, remove it if present. Returns whether the
    /// driver is assigned afterwards.
    pub fn toggle(&mut self, driver: DriverId) -> bool {
        if self.unassign(driver) {
            false
        } else {
            self.assign(driver)
        }
    }
}

/// A driver: a user account with a license number.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Driver {
    pub id: DriverId,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: LicenseNumber,
    pub date_joined: DateTime<Utc>,
}

impl Driver {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Searchable for Manufacturer {
    const SEARCH_FIELD: &'static str = "name";

    fn search_value(&self) -> &str {
        &self.name
    }
}

impl Searchable for Car {
    const SEARCH_FIELD: &'static str = "model";

    fn search_value(&self) -> &str {
        &self.model
    }
}

impl Searchable for Driver {
    const SEARCH_FIELD: &'static str = "username";

    fn search_value(&self) -> &str {
        &self.username
    }
}
