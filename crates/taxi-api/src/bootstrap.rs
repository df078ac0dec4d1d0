//! # Fleet Bootstrap
//!
//! Builds the application state at startup and, when a fixture file is
//! given, seeds it with manufacturers, cars and drivers.
//!
//! ## Bootstrap Sequence
//!
//! 1. **Build State**: empty stores and the password hasher.
//! 2. **Load Fixtures**: parse the YAML file, rejecting unknown keys.
//! 3. **Seed Drivers**: first, so cars can name them by username.
//! 4. **Seed Manufacturers**, then **Cars**, which name their manufacturer.
//!
//! Every record goes through the same form validation as the HTTP endpoints.
//! The first rejected record aborts startup.
//!
//! ## Fixture Format
//!
//! ```yaml
//! drivers:
//!   - { username: admin, password: "s3cret", license_number: ABC12345 }
//! manufacturers:
//!   - { name: Lincoln, country: USA }
//! cars:
//!   - { model: Town Car, manufacturer: Lincoln, drivers: [admin] }
//! ```

use std::path::Path;

use serde::Deserialize;
use taxi_core::{CarForm, DriverCreationForm, ManufacturerForm, PasswordError};

use crate::fleet;
use crate::state::{AppConfig, AppState};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// Fixture file not found at the given path.
    #[error("fixture file not found: {path}")]
    FixturesNotFound { path: String },

    /// Fixture file is not valid YAML of the expected shape.
    #[error("invalid fixture file: {0}")]
    InvalidFixtures(String),

    /// A fixture record was rejected.
    #[error("fixture {kind} '{key}' rejected: {reason}")]
    RejectedRecord {
        kind: &'static str,
        key: String,
        reason: String,
    },

    /// The configured password hashing cost is invalid.
    #[error("password hasher: {0}")]
    Password(#[from] PasswordError),

    /// IO error during bootstrap.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Fixture file
// ---------------------------------------------------------------------------

/// Parsed fixture file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixtures {
    pub drivers: Vec<DriverFixture>,
    pub manufacturers: Vec<ManufacturerFixture>,
    pub cars: Vec<CarFixture>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverFixture {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub license_number: String,
}

impl std::fmt::Debug for DriverFixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverFixture")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("license_number", &self.license_number)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManufacturerFixture {
    pub name: String,
    pub country: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CarFixture {
    pub model: String,
    /// Manufacturer name.
    pub manufacturer: String,
    /// Driver usernames.
    #[serde(default)]
    pub drivers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Build the application state, seeded from `fixtures` when given.
pub fn bootstrap(config: AppConfig, fixtures: Option<&Path>) -> Result<AppState, BootstrapError> {
    let state = AppState::with_config(config)?;

    match fixtures {
        Some(path) => {
            let fixtures = load_fixtures(path)?;
            seed(&state, fixtures)?;
            tracing::info!(
                path = %path.display(),
                drivers = state.drivers.len(),
                manufacturers = state.manufacturers.len(),
                cars = state.cars.len(),
                "fixtures loaded"
            );
        }
        None => tracing::info!("starting with an empty fleet (no fixture file)"),
    }

    Ok(state)
}

// ---------------------------------------------------------------------------
// Phase 2: Load Fixtures
// ---------------------------------------------------------------------------

fn load_fixtures(path: &Path) -> Result<Fixtures, BootstrapError> {
    if !path.exists() {
        return Err(BootstrapError::FixturesNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_fixtures(&content)
}

fn parse_fixtures(content: &str) -> Result<Fixtures, BootstrapError> {
    if content.trim().is_empty() {
        return Ok(Fixtures::default());
    }
    serde_yaml::from_str(content).map_err(|e| BootstrapError::InvalidFixtures(e.to_string()))
}

// ---------------------------------------------------------------------------
// Phases 3 and 4: Seed
// ---------------------------------------------------------------------------

fn seed(state: &AppState, fixtures: Fixtures) -> Result<(), BootstrapError> {
    for d in fixtures.drivers {
        let key = d.username.clone();
        let form = DriverCreationForm {
            username: d.username,
            password1: d.password.clone(),
            password2: d.password,
            first_name: d.first_name,
            last_name: d.last_name,
            license_number: d.license_number,
        };
        fleet::create_driver(state, form).map_err(|e| rejected("driver", &key, e))?;
    }

    for m in fixtures.manufacturers {
        let key = m.name.clone();
        let form = ManufacturerForm {
            name: m.name,
            country: m.country,
        };
        fleet::create_manufacturer(state, form).map_err(|e| rejected("manufacturer", &key, e))?;
    }

    for c in fixtures.cars {
        let manufacturer = state
            .manufacturers
            .read()
            .values()
            .find(|m| m.name == c.manufacturer)
            .map(|m| m.id)
            .ok_or_else(|| {
                rejected("car", &c.model, format!("unknown manufacturer '{}'", c.manufacturer))
            })?;

        let mut drivers = Vec::with_capacity(c.drivers.len());
        for username in &c.drivers {
            let id = state
                .drivers
                .read()
                .values()
                .find(|d| &d.username == username)
                .map(|d| d.id)
                .ok_or_else(|| rejected("car", &c.model, format!("unknown driver '{username}'")))?;
            drivers.push(id);
        }

        let key = c.model.clone();
        let form = CarForm {
            model: c.model,
            manufacturer: Some(manufacturer),
            drivers,
        };
        fleet::create_car(state, form).map_err(|e| rejected("car", &key, e))?;
    }

    Ok(())
}

fn rejected(kind: &'static str, key: &str, reason: impl std::fmt::Display) -> BootstrapError {
    BootstrapError::RejectedRecord {
        kind,
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
