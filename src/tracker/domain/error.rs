//! Error types for tracker domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tracker domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TrackerDomainError {
    /// A required text field is empty after trimming.
    #[error("{field} must not be empty")]
    EmptyField {
        /// Name of the offending field.
        field: &'static str,
    },

    /// A text field exceeds its maximum length.
    #[error("{field} exceeds {max} characters")]
    FieldTooLong {
        /// Name of the offending field.
        field: &'static str,
        /// Maximum number of characters accepted.
        max: usize,
    },

    /// An hours value is negative or not a finite number.
    #[error("{field} must be a finite number of hours >= 0")]
    InvalidHours {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl TrackerDomainError {
    /// Validates a required, bounded text field and returns it trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::EmptyField`] or
    /// [`TrackerDomainError::FieldTooLong`].
    pub fn require_text(
        field: &'static str,
        value: &str,
        max: usize,
    ) -> Result<String, Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Self::EmptyField { field });
        }
        Self::check_length(field, trimmed, max)?;
        Ok(trimmed.to_owned())
    }

    /// Validates an optional bounded text field.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::FieldTooLong`] when the value is too long.
    pub fn optional_text(
        field: &'static str,
        value: Option<String>,
        max: usize,
    ) -> Result<Option<String>, Self> {
        match value {
            Some(text) => {
                Self::check_length(field, &text, max)?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Validates an hours value.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerDomainError::InvalidHours`] for negative, NaN or
    /// infinite values.
    pub fn check_hours(field: &'static str, hours: f64) -> Result<f64, Self> {
        if hours.is_finite() && hours >= 0.0 {
            Ok(hours)
        } else {
            Err(Self::InvalidHours { field })
        }
    }

    fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), Self> {
        if value.chars().count() > max {
            return Err(Self::FieldTooLong { field, max });
        }
        Ok(())
    }
}

/// Error returned while parsing stored enumeration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseTrackerValueError {
    /// Enumeration being parsed.
    pub kind: &'static str,
    /// Raw stored value.
    pub value: String,
}

impl ParseTrackerValueError {
    /// Creates a parse error for the named enumeration.
    #[must_use]
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}
