//! # Forms
//!
//! Submitted-form types and their field-level validation.
//!
//! Every field defaults to empty on deserialization so that a missing field is
//! reported as a field error ("This field is required.") instead of a parse
//! failure. Rules that need the stored collections (uniqueness, references to
//! existing records) are checked by the API layer on top of [`Validate`].
//!
//! Text fields are trimmed before they are checked or stored; passwords are
//! taken verbatim.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{FieldErrors, TaxiError};
use crate::identity::{DriverId, ManufacturerId};
use crate::license::LicenseNumber;
use crate::password::PasswordHasher;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";

/// Maximum length of names, countries, and car models.
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum length of usernames and personal names.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Forms whose fields can be checked without looking at stored records.
pub trait Validate {
    /// Check every field, reporting all failures at once.
    fn validate(&self) -> Result<(), FieldErrors>;
}

fn check_required(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        false
    } else {
        true
    }
}

fn check_max_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize) {
    let len = value.trim().chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Check a license number field, recording the validator's message.
fn check_license(errors: &mut FieldErrors, value: &str) {
    if check_required(errors, "license_number", value) {
        if let Err(e) = LicenseNumber::parse(value.trim()) {
            errors.add("license_number", e.to_string());
        }
    }
}

/// Convert a license field to a [`LicenseNumber`], or a field error.
fn cleaned_license(value: &str) -> Result<LicenseNumber, FieldErrors> {
    LicenseNumber::parse(value.trim())
        .map_err(|e| FieldErrors::single("license_number", e.to_string()))
}

// ── Manufacturer ────────────────────────────────────────────────────

/// Create or update a manufacturer.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct ManufacturerForm {
    pub name: String,
    pub country: String,
}

impl Validate for ManufacturerForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if check_required(&mut errors, "name", &self.name) {
            check_max_length(&mut errors, "name", &self.name, MAX_NAME_LENGTH);
        }
        if check_required(&mut errors, "country", &self.country) {
            check_max_length(&mut errors, "country", &self.country, MAX_NAME_LENGTH);
        }
        errors.into_result()
    }
}

// ── Car ─────────────────────────────────────────────────────────────

/// Create or update a car.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CarForm {
    pub model: String,
    pub manufacturer: Option<ManufacturerId>,
    pub drivers: Vec<DriverId>,
}

impl CarForm {
    /// Selected drivers without duplicates, in submission order.
    pub fn distinct_drivers(&self) -> Vec<DriverId> {
        let mut seen = Vec::with_capacity(self.drivers.len());
        for id in &self.drivers {
            if !seen.contains(id) {
                seen.push(*id);
            }
        }
        seen
    }
}

impl Validate for CarForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if check_required(&mut errors, "model", &self.model) {
            check_max_length(&mut errors, "model", &self.model, MAX_NAME_LENGTH);
        }
        if self.manufacturer.is_none() {
            errors.add("manufacturer", REQUIRED);
        }
        errors.into_result()
    }
}

// ── Driver ──────────────────────────────────────────────────────────

/// Register a new driver account.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DriverCreationForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: String,
}

impl DriverCreationForm {
    /// The validated license number.
    pub fn cleaned_license(&self) -> Result<LicenseNumber, FieldErrors> {
        cleaned_license(&self.license_number)
    }

    /// Validate the form and hash the password.
    ///
    /// Uniqueness of the username and license number is not checked here.
    pub fn into_new_driver(self, hasher: &PasswordHasher) -> Result<NewDriver, TaxiError> {
        self.validate()?;
        let license_number = self.cleaned_license()?;
        let password_hash = hasher.hash(&self.password1)?;
        Ok(NewDriver {
            username: self.username.trim().to_string(),
            password_hash,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            license_number,
        })
    }
}

/// A validated driver registration with the password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDriver {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub license_number: LicenseNumber,
}

impl std::fmt::Debug for DriverCreationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverCreationForm")
            .field("username", &self.username)
            .field("password1", &"[REDACTED]")
            .field("password2", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("license_number", &self.license_number)
            .finish()
    }
}

impl Validate for DriverCreationForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if check_required(&mut errors, "username", &self.username) {
            let username = self.username.trim();
            check_max_length(&mut errors, "username", username, MAX_USERNAME_LENGTH);
            if !username.chars().all(is_username_char) {
                errors.add("username", INVALID_USERNAME);
            }
        }

        let has_first = check_required(&mut errors, "password1", &self.password1);
        let has_second = check_required(&mut errors, "password2", &self.password2);
        if has_first && has_second && self.password1 != self.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        }

        check_max_length(&mut errors, "first_name", &self.first_name, MAX_USERNAME_LENGTH);
        check_max_length(&mut errors, "last_name", &self.last_name, MAX_USERNAME_LENGTH);
        check_license(&mut errors, &self.license_number);

        errors.into_result()
    }
}

/// Change a driver's license number.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct DriverLicenseUpdateForm {
    pub license_number: String,
}

impl DriverLicenseUpdateForm {
    /// The validated license number.
    pub fn cleaned_license(&self) -> Result<LicenseNumber, FieldErrors> {
        cleaned_license(&self.license_number)
    }
}

impl Validate for DriverLicenseUpdateForm {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_license(&mut errors, &self.license_number);
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver_form() -> DriverCreationForm {
        DriverCreationForm {
            username: "test".to_string(),
            password1: "Test123".to_string(),
            password2: "Test123".to_string(),
            first_name: "Test_first".to_string(),
            last_name: "Test_last".to_string(),
            license_number: "ABC12345".to_string(),
        }
    }

    fn license_errors(value: &str) -> Option<Vec<String>> {
        let form = DriverLicenseUpdateForm {
            license_number: value.to_string(),
        };
        form.validate()
            .err()
            .and_then(|e| e.get("license_number").map(<[String]>::to_vec))
    }

    #[test]
    fn license_update_rejects_seven_characters() {
        assert_eq!(
            license_errors("ABC1234"),
            Some(vec!["License number should consist of 8 characters".to_string()])
        );
    }

    #[test]
    fn license_update_rejects_lowercase_prefix() {
        assert_eq!(
            license_errors("AsC12345"),
            Some(vec!["First 3 characters should be uppercase letters".to_string()])
        );
    }

    #[test]
    fn license_update_rejects_non_digit_suffix() {
        assert_eq!(
            license_errors("ABCdefgh"),
            Some(vec!["Last 5 characters should be digits".to_string()])
        );
    }

    #[test]
    fn license_update_accepts_valid_number() {
        assert_eq!(license_errors("ABC12345"), None);
    }

    #[test]
    fn license_update_requires_value() {
        assert_eq!(license_errors("  "), Some(vec![REQUIRED.to_string()]));
    }

    #[test]
    fn license_update_deserializes_with_missing_field() {
        let form: DriverLicenseUpdateForm = serde_json::from_str("{}").unwrap();
        assert!(form.validate().unwrap_err().has("license_number"));
    }

    #[test]
    fn creation_form_accepts_valid_input() {
        let form = driver_form();
        assert!(form.validate().is_ok());
        assert_eq!(form.cleaned_license().unwrap().as_str(), "ABC12345");
    }

    #[test]
    fn creation_form_uses_the_same_license_rule() {
        for bad in ["ABC1234", "AsC12345", "ABCdefgh"] {
            let form = DriverCreationForm {
                license_number: bad.to_string(),
                ..driver_form()
            };
            let errors = form.validate().unwrap_err();
            assert!(errors.has("license_number"), "{bad} should be rejected");
            assert_eq!(errors.len(), 1);
        }
    }

    #[test]
    fn creation_form_reports_password_mismatch() {
        let form = DriverCreationForm {
            password2: "other".to_string(),
            ..driver_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("password2").unwrap(), [PASSWORD_MISMATCH.to_string()]);
    }

    #[test]
    fn creation_form_rejects_bad_username_characters() {
        let form = DriverCreationForm {
            username: "bad name!".to_string(),
            ..driver_form()
        };
        assert_eq!(
            form.validate().unwrap_err().get("username").unwrap(),
            [INVALID_USERNAME.to_string()]
        );
    }

    #[test]
    fn creation_form_allows_username_punctuation() {
        let form = DriverCreationForm {
            username: "j.doe+taxi@fleet_1-a".to_string(),
            ..driver_form()
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn creation_form_reports_every_missing_field() {
        let errors = DriverCreationForm::default().validate().unwrap_err();
        for field in ["username", "password1", "password2", "license_number"] {
            assert_eq!(errors.get(field).unwrap(), [REQUIRED.to_string()], "{field}");
        }
        assert!(!errors.has("first_name"));
    }

    #[test]
    fn creation_form_limits_username_length() {
        let form = DriverCreationForm {
            username: "u".repeat(MAX_USERNAME_LENGTH + 1),
            ..driver_form()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("username").unwrap()[0].contains("at most 150"));
    }

    #[test]
    fn into_new_driver_trims_and_hashes() {
        let hasher = PasswordHasher::new(crate::password::PasswordCost::minimal()).unwrap();
        let form = DriverCreationForm {
            username: "  test ".to_string(),
            ..driver_form()
        };
        let new = form.into_new_driver(&hasher).unwrap();
        assert_eq!(new.username, "test");
        assert_eq!(new.license_number.as_str(), "ABC12345");
        assert!(hasher.verify("Test123", &new.password_hash).unwrap());
    }

    #[test]
    fn into_new_driver_rejects_invalid_form() {
        let hasher = PasswordHasher::new(crate::password::PasswordCost::minimal()).unwrap();
        let form = DriverCreationForm {
            license_number: "AsC12345".to_string(),
            ..driver_form()
        };
        match form.into_new_driver(&hasher) {
            Err(TaxiError::Validation(errors)) => assert!(errors.has("license_number")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn debug_output_hides_passwords() {
        let shown = format!("{:?}", driver_form());
        assert!(!shown.contains("Test123"));
        assert!(shown.contains("ABC12345"));
    }

    #[test]
    fn manufacturer_form_requires_both_fields() {
        let errors = ManufacturerForm::default().validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("country"));
    }

    #[test]
    fn manufacturer_form_limits_length() {
        let form = ManufacturerForm {
            name: "n".repeat(MAX_NAME_LENGTH + 1),
            country: "Japan".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("name"));
        assert!(!errors.has("country"));
    }

    #[test]
    fn car_form_requires_model_and_manufacturer() {
        let errors = CarForm::default().validate().unwrap_err();
        assert!(errors.has("model"));
        assert_eq!(errors.get("manufacturer").unwrap(), [REQUIRED.to_string()]);
    }

    #[test]
    fn car_form_deduplicates_drivers() {
        let form = CarForm {
            model: "Prius".to_string(),
            manufacturer: Some(ManufacturerId(1)),
            drivers: vec![DriverId(2), DriverId(1), DriverId(2)],
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.distinct_drivers(), vec![DriverId(2), DriverId(1)]);
    }
}
