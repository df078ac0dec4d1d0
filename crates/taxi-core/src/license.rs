//! # Driver License Numbers
//!
//! A license number is exactly 8 characters: three uppercase ASCII letters
//! followed by five ASCII digits (`AAA99999`).
//!
//! The checks run in a fixed order (length, letters, digits) and the first
//! failure is reported. The same rule guards driver creation and license
//! updates.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Total length of a license number.
pub const LICENSE_LENGTH: usize = 8;

/// Number of leading uppercase letters.
pub const LICENSE_PREFIX_LENGTH: usize = 3;

/// Why a candidate license number was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    #[error("License number should consist of 8 characters")]
    WrongLength { actual: usize },

    #[error("First 3 characters should be uppercase letters")]
    PrefixNotUppercase { position: usize },

    #[error("Last 5 characters should be digits")]
    SuffixNotDigits { position: usize },
}

/// Check a candidate license number.
///
/// Length is counted in characters, so a multi-byte character counts once.
pub fn validate_license_number(candidate: &str) -> Result<(), LicenseError> {
    let chars: Vec<char> = candidate.chars().collect();
    if chars.len() != LICENSE_LENGTH {
        return Err(LicenseError::WrongLength {
            actual: chars.len(),
        });
    }

    let (prefix, suffix) = chars.split_at(LICENSE_PREFIX_LENGTH);
    if let Some(position) = prefix.iter().position(|c| !c.is_ascii_uppercase()) {
        return Err(LicenseError::PrefixNotUppercase { position });
    }
    if let Some(offset) = suffix.iter().position(|c| !c.is_ascii_digit()) {
        return Err(LicenseError::SuffixNotDigits {
            position: LICENSE_PREFIX_LENGTH + offset,
        });
    }
    Ok(())
}

/// A license number that has passed [`validate_license_number`].
///
/// Deserialization validates too, so a `LicenseNumber` read from any input
/// is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "ABC12345")]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Validate and wrap a license number.
    pub fn parse(candidate: impl Into<String>) -> Result<Self, LicenseError> {
        let candidate = candidate.into();
        validate_license_number(&candidate)?;
        Ok(Self(candidate))
    }

    /// The license number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LicenseNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_well_formed_number() {
        assert!(validate_license_number("ABC12345").is_ok());
        assert_eq!(LicenseNumber::parse("XYZ00000").unwrap().as_str(), "XYZ00000");
    }

    #[test]
    fn rejects_short_number() {
        assert_eq!(
            validate_license_number("ABC1234"),
            Err(LicenseError::WrongLength { actual: 7 })
        );
    }

    #[test]
    fn rejects_long_number() {
        assert_eq!(
            validate_license_number("ABC123456"),
            Err(LicenseError::WrongLength { actual: 9 })
        );
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            validate_license_number(""),
            Err(LicenseError::WrongLength { actual: 0 })
        ));
    }

    #[test]
    fn rejects_lowercase_in_prefix() {
        assert_eq!(
            validate_license_number("AsC12345"),
            Err(LicenseError::PrefixNotUppercase { position: 1 })
        );
    }

    #[test]
    fn rejects_digit_in_prefix() {
        assert_eq!(
            validate_license_number("A1C12345"),
            Err(LicenseError::PrefixNotUppercase { position: 1 })
        );
    }

    #[test]
    fn rejects_letters_in_suffix() {
        assert_eq!(
            validate_license_number("ABCdefgh"),
            Err(LicenseError::SuffixNotDigits { position: 3 })
        );
        assert_eq!(
            validate_license_number("ABC1234X"),
            Err(LicenseError::SuffixNotDigits { position: 7 })
        );
    }

    #[test]
    fn non_ascii_letters_are_not_uppercase_letters() {
        // Eight characters, but the first is a non-ASCII uppercase letter.
        assert!(matches!(
            validate_license_number("ÄBC12345"),
            Err(LicenseError::PrefixNotUppercase { position: 0 })
        ));
        assert!(matches!(
            validate_license_number("ABC1234٣"),
            Err(LicenseError::SuffixNotDigits { position: 7 })
        ));
    }

    #[test]
    fn length_is_checked_before_format() {
        assert!(matches!(
            validate_license_number("abc"),
            Err(LicenseError::WrongLength { .. })
        ));
    }

    #[test]
    fn error_messages_are_user_facing() {
        assert_eq!(
            LicenseError::WrongLength { actual: 3 }.to_string(),
            "License number should consist of 8 characters"
        );
        assert_eq!(
            LicenseError::PrefixNotUppercase { position: 0 }.to_string(),
            "First 3 characters should be uppercase letters"
        );
        assert_eq!(
            LicenseError::SuffixNotDigits { position: 3 }.to_string(),
            "Last 5 characters should be digits"
        );
    }

    #[test]
    fn deserialization_validates() {
        let ok: LicenseNumber = serde_json::from_str("\"QWE98765\"").unwrap();
        assert_eq!(ok.to_string(), "QWE98765");
        assert!(serde_json::from_str::<LicenseNumber>("\"qwe98765\"").is_err());
    }

    proptest! {
        #[test]
        fn any_length_other_than_eight_fails(s in "\\PC{0,20}") {
            prop_assume!(s.chars().count() != LICENSE_LENGTH);
            prop_assert!(validate_license_number(&s).is_err());
        }

        #[test]
        fn well_formed_numbers_pass(s in "[A-Z]{3}[0-9]{5}") {
            prop_assert!(validate_license_number(&s).is_ok());
        }

        #[test]
        fn non_uppercase_prefix_fails(
            letters in "[A-Z]{3}",
            digits in "[0-9]{5}",
            position in 0usize..LICENSE_PREFIX_LENGTH,
            bad in "[a-z0-9]",
        ) {
            let mut head: Vec<char> = letters.chars().collect();
            head[position] = bad.chars().next().unwrap();
            let candidate = format!("{}{digits}", head.into_iter().collect::<String>());
            prop_assert_eq!(
                validate_license_number(&candidate),
                Err(LicenseError::PrefixNotUppercase { position })
            );
        }

        #[test]
        fn non_digit_suffix_fails(
            letters in "[A-Z]{3}",
            digits in "[0-9]{5}",
            offset in 0usize..(LICENSE_LENGTH - LICENSE_PREFIX_LENGTH),
            bad in "[A-Za-z]",
        ) {
            let mut tail: Vec<char> = digits.chars().collect();
            tail[offset] = bad.chars().next().unwrap();
            let candidate = format!("{letters}{}", tail.into_iter().collect::<String>());
            prop_assert_eq!(
                validate_license_number(&candidate),
                Err(LicenseError::SuffixNotDigits { position: LICENSE_PREFIX_LENGTH + offset })
            );
        }
    }
}
