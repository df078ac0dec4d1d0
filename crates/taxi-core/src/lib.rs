//! # taxi-core: Domain Types for the Taxi Fleet Service
//!
//! Everything in this crate is plain data and pure functions. The HTTP layer
//! (`taxi-api`) owns state, sessions, and routing; this crate owns the rules.
//!
//! ## Contents
//!
//! - [`identity`]: typed, sequential record identifiers.
//! - [`model`]: manufacturer, car, and driver records.
//! - [`license`]: the `AAA99999` driver license validator.
//! - [`forms`]: submitted-form types and field-level validation.
//! - [`search`]: case-insensitive substring filtering on one field.
//! - [`pagination`]: fixed-size page slicing with clamped page numbers.
//! - [`password`]: Argon2id password hashing for driver accounts.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `taxi-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod forms;
pub mod identity;
pub mod license;
pub mod model;
pub mod pagination;
pub mod password;
pub mod search;

pub use error::{FieldErrors, TaxiError};
pub use forms::{
    CarForm, DriverCreationForm, DriverLicenseUpdateForm, ManufacturerForm, NewDriver, Validate,
};
pub use identity::{CarId, DriverId, ManufacturerId, RecordId};
pub use license::{validate_license_number, LicenseError, LicenseNumber};
pub use model::{Car, Driver, Manufacturer};
pub use pagination::{Page, PageMeta, PageRequest, Paginator, PAGE_SIZE};
pub use password::{PasswordCost, PasswordError, PasswordHasher};
pub use search::{filter_by_search, Searchable, MAX_SEARCH_LENGTH};
