//! # Error Types
//!
//! Form validation produces [`FieldErrors`]: every rejected field with the
//! messages that explain why, so a client can show them next to the input.
//! [`TaxiError`] is the crate-level error for callers that mix validation
//! with password hashing (e.g. creating a driver).

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::password::PasswordError;

/// Field-level validation errors collected from one form submission.
///
/// Serializes as a map of field name to messages, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// An empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message for `field`.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Whether `field` has at least one message.
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Iterate over `(field, messages)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in self.iter() {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Top-level error type for the taxi domain.
#[derive(Error, Debug)]
pub enum TaxiError {
    /// A submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// Password hashing or verification failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
}
