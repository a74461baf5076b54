//! Field validators and request validation helpers
//!
//! Validators never fail: each returns a [`ValidationOutcome`] carrying a
//! verdict and a human-readable message. Handlers decide what an invalid
//! outcome means, usually a 400 through [`ValidationOutcome::into_result`].

pub mod dates;
pub mod document;
pub mod email;
pub mod license;
pub mod password;

pub use dates::{parse_appointment_time, parse_calendar_date, validate_not_future};
pub use document::{
    complete_cpf, format_cnpj, format_cpf, only_digits, validate_cnpj, validate_cpf,
};
pub use email::validate_email;
pub use license::validate_license_number;
pub use password::validate_password_strength;

use serde::Serialize;

use crate::error::ApiError;

/// Verdict of a single field validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub message: String,
}

impl ValidationOutcome {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    /// Turns an invalid outcome into a validation error carrying its message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the outcome is invalid.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.valid {
            Ok(())
        } else {
            Err(ApiError::validation(self.message))
        }
    }
}

/// Trait for validating request payloads
///
/// Implement this trait for create/update request types so handlers can run
/// every cheap, database-free check with one call before opening a
/// transaction.
pub trait RequestValidation {
    /// Returns the first rule the request breaks
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the failed rule.
    fn validate(&self) -> Result<(), ApiError>;
}

/// Returns the trimmed value of a required text field.
///
/// # Errors
///
/// Fails with "Field `name` is required" when the value is missing or blank.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::validation(format!("Field {field} is required"))),
    }
}

/// Trims an optional text field, treating blank text as absent.
#[must_use]
pub fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Returns a required numeric field.
///
/// # Errors
///
/// Fails with "Field `name` is required" when the value is missing.
pub fn required_id(value: Option<i64>, field: &str) -> Result<i64, ApiError> {
    value.ok_or_else(|| ApiError::validation(format!("Field {field} is required")))
}

/// Rejects an update body that names no field.
///
/// # Errors
///
/// Fails with "No data provided" when `is_empty` is true.
pub fn require_changes(is_empty: bool) -> Result<(), ApiError> {
    if is_empty {
        Err(ApiError::validation("No data provided"))
    } else {
        Ok(())
    }
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.name.len() <= 100, "Name must be at most 100 characters");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        let missing: Option<String> = None;
        let blank = Some("   ".to_string());
        let present = Some("  Maria ".to_string());

        assert_eq!(
            required(&missing, "name").unwrap_err().to_string(),
            "Field name is required"
        );
        assert!(required(&blank, "name").is_err());
        assert_eq!(required(&present, "name").unwrap(), "Maria");
    }

    #[test]
    fn optional_drops_blank_text() {
        assert_eq!(optional(Some("  ".to_string())), None);
        assert_eq!(optional(Some(" Unimed ".to_string())).as_deref(), Some("Unimed"));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn required_id_reports_field() {
        assert_eq!(required_id(Some(3), "patient_id").unwrap(), 3);
        assert_eq!(
            required_id(None, "patient_id").unwrap_err().to_string(),
            "Field patient_id is required"
        );
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(require_changes(false).is_ok());
        assert_eq!(require_changes(true).unwrap_err().to_string(), "No data provided");
    }

    #[test]
    fn invalid_outcome_becomes_validation_error() {
        assert!(ValidationOutcome::valid("ok").into_result().is_ok());

        let err = ValidationOutcome::invalid("CPF is invalid").into_result().unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));
        assert_eq!(err.to_string(), "CPF is invalid");
    }

    struct NameChange {
        name: String,
    }

    impl RequestValidation for NameChange {
        fn validate(&self) -> Result<(), ApiError> {
            validate_field!(!self.name.trim().is_empty(), "Name cannot be empty");
            validate_field!(self.name.len() <= 100, "Name must be at most 100 characters");
            Ok(())
        }
    }

    #[test]
    fn validate_field_macro_short_circuits() {
        assert!(NameChange { name: "Ana".into() }.validate().is_ok());
        let err = NameChange { name: " ".into() }.validate().unwrap_err();
        assert_eq!(err.to_string(), "Name cannot be empty");
    }
}
