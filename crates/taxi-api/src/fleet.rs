//! # Fleet Operations
//!
//! Every write to the fleet goes through this module, from the HTTP handlers
//! and from the fixture loader alike, so both apply the same rules:
//!
//! 1. **Field validation**: the form's own [`Validate`] impl.
//! 2. **Store checks**: uniqueness (manufacturer name, driver username and
//!    license number) and references (a car's manufacturer and drivers must
//!    exist).
//! 3. **Write**: only when both steps pass. A rejected form changes nothing.
//!
//! Each operation holds the write locks it needs from the first check to the
//! write, in the order documented in [`crate::state`].
//!
//! ## Referential Rules
//!
//! - Deleting a manufacturer deletes its cars.
//! - Deleting a driver removes it from every car and ends its sessions.

use chrono::Utc;
use taxi_core::forms::{INVALID_CHOICE, REQUIRED};
use taxi_core::{
    Car, CarForm, CarId, Driver, DriverCreationForm, DriverId, DriverLicenseUpdateForm,
    FieldErrors, Manufacturer, ManufacturerForm, ManufacturerId, Validate,
};

use crate::error::AppError;
use crate::state::{AppState, Records};

const MANUFACTURER_NAME_TAKEN: &str = "Manufacturer with this Name already exists.";
const USERNAME_TAKEN: &str = "A user with that username already exists.";
const LICENSE_TAKEN: &str = "Driver with this License number already exists.";

/// Field errors of `form`, empty when it is valid.
fn field_errors(form: &impl Validate) -> FieldErrors {
    form.validate().err().unwrap_or_default()
}

fn unknown_choice(value: impl std::fmt::Display) -> String {
    format!("{INVALID_CHOICE} {value} is not one of the available choices.")
}

// ── Manufacturers ───────────────────────────────────────────────────

fn check_manufacturer_name(
    errors: &mut FieldErrors,
    name: &str,
    taken: impl Fn(&str) -> bool,
) {
    if !errors.has("name") && taken(name) {
        errors.add("name", MANUFACTURER_NAME_TAKEN);
    }
}

/// Create a manufacturer from a submitted form.
pub fn create_manufacturer(
    state: &AppState,
    form: ManufacturerForm,
) -> Result<Manufacturer, AppError> {
    let mut records = state.manufacturers.write();
    let mut errors = field_errors(&form);
    let name = form.name.trim();
    check_manufacturer_name(&mut errors, name, |n| {
        records.values().any(|m| m.name == n)
    });
    errors.into_result()?;

    let manufacturer = records.insert_with(|id| Manufacturer {
        id,
        name: name.to_string(),
        country: form.country.trim().to_string(),
    });
    tracing::info!(id = %manufacturer.id, name = %manufacturer.name, "manufacturer created");
    Ok(manufacturer)
}

/// Replace a manufacturer's fields from a submitted form.
pub fn update_manufacturer(
    state: &AppState,
    id: ManufacturerId,
    form: ManufacturerForm,
) -> Result<Manufacturer, AppError> {
    let mut records = state.manufacturers.write();
    if !records.contains(id) {
        return Err(AppError::not_found("manufacturer", id));
    }
    let mut errors = field_errors(&form);
    let name = form.name.trim();
    check_manufacturer_name(&mut errors, name, |n| {
        records.values().any(|m| m.id != id && m.name == n)
    });
    errors.into_result()?;

    let manufacturer = records
        .get_mut(id)
        .ok_or_else(|| AppError::not_found("manufacturer", id))?;
    manufacturer.name = name.to_string();
    manufacturer.country = form.country.trim().to_string();
    Ok(manufacturer.clone())
}

/// Delete a manufacturer and every car it made.
pub fn delete_manufacturer(state: &AppState, id: ManufacturerId) -> Result<Manufacturer, AppError> {
    let mut manufacturers = state.manufacturers.write();
    let mut cars = state.cars.write();
    let removed = manufacturers
        .remove(id)
        .ok_or_else(|| AppError::not_found("manufacturer", id))?;
    let before = cars.len();
    cars.retain(|car| car.manufacturer != id);
    tracing::info!(
        id = %id,
        cars_removed = before - cars.len(),
        "manufacturer deleted"
    );
    Ok(removed)
}

// ── Cars ────────────────────────────────────────────────────────────

/// Run the car form against the stores. Returns the manufacturer id and the
/// distinct driver ids to store.
///
/// The caller holds the manufacturer lock and passes it in; the driver lock is
/// taken here.
fn clean_car_form(
    state: &AppState,
    manufacturers: &Records<ManufacturerId, Manufacturer>,
    form: &CarForm,
) -> Result<(ManufacturerId, Vec<DriverId>), AppError> {
    let mut errors = field_errors(form);

    let manufacturer = match form.manufacturer {
        Some(id) if manufacturers.contains(id) => Some(id),
        Some(_) => {
            errors.add(
                "manufacturer",
                format!("{INVALID_CHOICE} That choice is not one of the available choices."),
            );
            None
        }
        None => None,
    };

    let drivers = form.distinct_drivers();
    {
        let known = state.drivers.read();
        for id in drivers.iter().filter(|id| !known.contains(**id)) {
            errors.add("drivers", unknown_choice(id));
        }
    }

    errors.into_result()?;
    let manufacturer =
        manufacturer.ok_or_else(|| FieldErrors::single("manufacturer", REQUIRED))?;
    Ok((manufacturer, drivers))
}

/// Create a car from a submitted form.
pub fn create_car(state: &AppState, form: CarForm) -> Result<Car, AppError> {
    // The manufacturer stays locked until the insert so it cannot be deleted
    // in between.
    let manufacturers = state.manufacturers.read();
    let mut cars = state.cars.write();
    let (manufacturer, drivers) = clean_car_form(state, &manufacturers, &form)?;

    let car = cars.insert_with(|id| Car {
        id,
        model: form.model.trim().to_string(),
        manufacturer,
        drivers,
    });
    tracing::info!(id = %car.id, model = %car.model, "car created");
    Ok(car)
}

/// Replace a car's fields from a submitted form.
pub fn update_car(state: &AppState, id: CarId, form: CarForm) -> Result<Car, AppError> {
    let manufacturers = state.manufacturers.read();
    let mut cars = state.cars.write();
    if !cars.contains(id) {
        return Err(AppError::not_found("car", id));
    }
    let (manufacturer, drivers) = clean_car_form(state, &manufacturers, &form)?;

    let car = cars.get_mut(id).ok_or_else(|| AppError::not_found("car", id))?;
    car.model = form.model.trim().to_string();
    car.manufacturer = manufacturer;
    car.drivers = drivers;
    Ok(car.clone())
}

/// Delete a car. Its drivers are unaffected.
pub fn delete_car(state: &AppState, id: CarId) -> Result<Car, AppError> {
    let removed = state
        .cars
        .remove(id)
        .ok_or_else(|| AppError::not_found("car", id))?;
    tracing::info!(id = %id, "car deleted");
    Ok(removed)
}

/// Assign `driver` to the car, or remove it if already assigned. Returns
/// whether the driver is assigned afterwards.
pub fn toggle_assignment(state: &AppState, car: CarId, driver: DriverId) -> Result<bool, AppError> {
    let mut cars = state.cars.write();
    if !state.drivers.contains(driver) {
        return Err(AppError::not_found("driver", driver));
    }
    let car = cars.get_mut(car).ok_or_else(|| AppError::not_found("car", car))?;
    let assigned = car.toggle(driver);
    tracing::info!(car = %car.id, driver = %driver, assigned, "car assignment toggled");
    Ok(assigned)
}

// ── Drivers ─────────────────────────────────────────────────────────

fn check_unique_driver(
    errors: &mut FieldErrors,
    drivers: &Records<DriverId, Driver>,
    username: &str,
    license: &str,
) {
    let username = username.trim().to_lowercase();
    if !errors.has("username")
        && drivers
            .values()
            .any(|d| d.username.to_lowercase() == username)
    {
        errors.add("username", USERNAME_TAKEN);
    }
    let license = license.trim();
    if !errors.has("license_number")
        && drivers.values().any(|d| d.license_number.as_str() == license)
    {
        errors.add("license_number", LICENSE_TAKEN);
    }
}

/// Register a new driver from the creation form.
///
/// Usernames are unique ignoring case.
pub fn create_driver(state: &AppState, form: DriverCreationForm) -> Result<Driver, AppError> {
    let mut errors = field_errors(&form);
    check_unique_driver(
        &mut errors,
        &state.drivers.read(),
        &form.username,
        &form.license_number,
    );
    errors.into_result()?;

    // Hashing runs unlocked, so uniqueness is checked again before the insert.
    let new = form.into_new_driver(&state.passwords)?;
    let mut drivers = state.drivers.write();
    let mut errors = FieldErrors::new();
    check_unique_driver(&mut errors, &drivers, &new.username, new.license_number.as_str());
    errors.into_result()?;

    let driver = drivers.insert_with(|id| Driver {
        id,
        username: new.username,
        password_hash: new.password_hash,
        first_name: new.first_name,
        last_name: new.last_name,
        license_number: new.license_number,
        date_joined: Utc::now(),
    });
    tracing::info!(id = %driver.id, username = %driver.username, "driver created");
    Ok(driver)
}

/// Change a driver's license number.
pub fn update_license(
    state: &AppState,
    id: DriverId,
    form: DriverLicenseUpdateForm,
) -> Result<Driver, AppError> {
    let mut drivers = state.drivers.write();
    if !drivers.contains(id) {
        return Err(AppError::not_found("driver", id));
    }
    let mut errors = field_errors(&form);
    let license = form.license_number.trim();
    if !errors.has("license_number")
        && drivers
            .values()
            .any(|d| d.id != id && d.license_number.as_str() == license)
    {
        errors.add("license_number", LICENSE_TAKEN);
    }
    errors.into_result()?;

    let license_number = form.cleaned_license()?;
    let driver = drivers
        .get_mut(id)
        .ok_or_else(|| AppError::not_found("driver", id))?;
    driver.license_number = license_number;
    tracing::info!(id = %id, "driver license updated");
    Ok(driver.clone())
}

/// Delete a driver, unassigning it from every car and ending its sessions.
pub fn delete_driver(state: &AppState, id: DriverId) -> Result<Driver, AppError> {
    let mut cars = state.cars.write();
    let mut drivers = state.drivers.write();
    let removed = drivers
        .remove(id)
        .ok_or_else(|| AppError::not_found("driver", id))?;
    for car in cars.values_mut() {
        car.unassign(id);
    }
    drop(drivers);
    drop(cars);
    state.sessions.end_all_for(id);
    tracing::info!(id = %id, "driver deleted");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use taxi_core::PasswordCost;

    fn test_state() -> AppState {
        AppState::with_config(AppConfig {
            password_cost: PasswordCost::minimal(),
        })
        .unwrap()
    }

    fn manufacturer(state: &AppState, name: &str) -> Manufacturer {
        create_manufacturer(
            state,
            ManufacturerForm {
                name: name.to_string(),
                country: "Japan".to_string(),
            },
        )
        .unwrap()
    }

    fn driver(state: &AppState, username: &str, license: &str) -> Driver {
        create_driver(
            state,
            DriverCreationForm {
                username: username.to_string(),
                password1: "test123".to_string(),
                password2: "test123".to_string(),
                license_number: license.to_string(),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn car_form(model: &str, manufacturer: ManufacturerId, drivers: Vec<DriverId>) -> CarForm {
        CarForm {
            model: model.to_string(),
            manufacturer: Some(manufacturer),
            drivers,
        }
    }

    fn validation_errors(result: Result<impl std::fmt::Debug, AppError>) -> FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn manufacturer_names_are_unique() {
        let state = test_state();
        manufacturer(&state, "Toyota");
        let errors = validation_errors(create_manufacturer(
            &state,
            ManufacturerForm {
                name: " Toyota ".to_string(),
                country: "Japan".to_string(),
            },
        ));
        assert_eq!(errors.get("name").unwrap(), [MANUFACTURER_NAME_TAKEN.to_string()]);
        assert_eq!(state.manufacturers.len(), 1);
    }

    #[test]
    fn manufacturer_update_may_keep_its_own_name() {
        let state = test_state();
        let m = manufacturer(&state, "Toyota");
        let updated = update_manufacturer(
            &state,
            m.id,
            ManufacturerForm {
                name: "Toyota".to_string(),
                country: "JP".to_string(),
            },
        )
        .unwrap();
        assert_eq!(updated.country, "JP");
    }

    #[test]
    fn deleting_manufacturer_cascades_to_cars() {
        let state = test_state();
        let toyota = manufacturer(&state, "Toyota");
        let honda = manufacturer(&state, "Honda");
        create_car(&state, car_form("Prius", toyota.id, vec![])).unwrap();
        create_car(&state, car_form("Camry", toyota.id, vec![])).unwrap();
        let civic = create_car(&state, car_form("Civic", honda.id, vec![])).unwrap();

        delete_manufacturer(&state, toyota.id).unwrap();
        assert_eq!(state.cars.list(), vec![civic]);
        assert!(matches!(
            delete_manufacturer(&state, toyota.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn car_requires_existing_manufacturer_and_drivers() {
        let state = test_state();
        let errors = validation_errors(create_car(
            &state,
            car_form("Prius", ManufacturerId(42), vec![DriverId(7)]),
        ));
        assert!(errors.get("manufacturer").unwrap()[0].starts_with(INVALID_CHOICE));
        assert_eq!(
            errors.get("drivers").unwrap(),
            [unknown_choice(DriverId(7))]
        );
        assert!(state.cars.is_empty());
    }

    #[test]
    fn car_drivers_are_deduplicated() {
        let state = test_state();
        let m = manufacturer(&state, "Toyota");
        let d = driver(&state, "test", "ABC12345");
        let car = create_car(&state, car_form("Prius", m.id, vec![d.id, d.id])).unwrap();
        assert_eq!(car.drivers, vec![d.id]);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let state = test_state();
        let m = manufacturer(&state, "Toyota");
        let d = driver(&state, "test", "ABC12345");
        let car = create_car(&state, car_form("Prius", m.id, vec![])).unwrap();

        assert!(toggle_assignment(&state, car.id, d.id).unwrap());
        assert!(state.cars.get(car.id).unwrap().has_driver(d.id));
        assert!(!toggle_assignment(&state, car.id, d.id).unwrap());
        assert!(state.cars.get(car.id).unwrap().drivers.is_empty());
        assert!(matches!(
            toggle_assignment(&state, CarId(99), d.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn usernames_are_unique_ignoring_case() {
        let state = test_state();
        driver(&state, "Driver1", "ABC12345");
        let errors = validation_errors(create_driver(
            &state,
            DriverCreationForm {
                username: "driver1".to_string(),
                password1: "x".to_string(),
                password2: "x".to_string(),
                license_number: "ABC12345".to_string(),
                ..Default::default()
            },
        ));
        assert_eq!(errors.get("username").unwrap(), [USERNAME_TAKEN.to_string()]);
        assert_eq!(errors.get("license_number").unwrap(), [LICENSE_TAKEN.to_string()]);
    }

    #[test]
    fn license_update_validates_and_checks_uniqueness() {
        let state = test_state();
        let first = driver(&state, "first", "ABC12345");
        driver(&state, "second", "XYZ00000");

        let bad = DriverLicenseUpdateForm {
            license_number: "AsC12345".to_string(),
        };
        let errors = validation_errors(update_license(&state, first.id, bad));
        assert_eq!(
            errors.get("license_number").unwrap(),
            ["First 3 characters should be uppercase letters".to_string()]
        );

        let taken = DriverLicenseUpdateForm {
            license_number: "XYZ00000".to_string(),
        };
        let errors = validation_errors(update_license(&state, first.id, taken));
        assert_eq!(errors.get("license_number").unwrap(), [LICENSE_TAKEN.to_string()]);

        let same = DriverLicenseUpdateForm {
            license_number: "ABC12345".to_string(),
        };
        assert!(update_license(&state, first.id, same).is_ok());

        let fresh = DriverLicenseUpdateForm {
            license_number: "QWE54321".to_string(),
        };
        let updated = update_license(&state, first.id, fresh).unwrap();
        assert_eq!(updated.license_number.as_str(), "QWE54321");
    }

    #[test]
    fn deleting_driver_unassigns_and_logs_out() {
        let state = test_state();
        let m = manufacturer(&state, "Toyota");
        let d = driver(&state, "test", "ABC12345");
        let other = driver(&state, "other", "XYZ00000");
        let car = create_car(&state, car_form("Prius", m.id, vec![d.id, other.id])).unwrap();
        let token = state.sessions.create(d.id);

        delete_driver(&state, d.id).unwrap();
        assert_eq!(state.cars.get(car.id).unwrap().drivers, vec![other.id]);
        assert!(state.sessions.lookup(&token.digest()).is_none());
    }
}
