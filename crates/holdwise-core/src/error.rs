//! Error types for holdings data.
//!
//! Ingested snapshots are assumed well formed. These errors surface only when
//! callers build domain values in code or parse labels from text.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while constructing holdings data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A period label could not be parsed.
    #[error("Invalid period '{label}': expected \"Q<1-4> <year>\" or \"<year>-Q<1-4>\"")]
    InvalidPeriod {
        /// The label that failed to parse.
        label: String,
    },

    /// Missing required field during construction.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// Invalid position data.
    #[error("Invalid position '{identifier}': {reason}")]
    InvalidPosition {
        /// The security identifier of the position.
        identifier: String,
        /// The reason the position is invalid.
        reason: String,
    },

    /// Invalid snapshot data.
    #[error("Invalid snapshot for {period}: {reason}")]
    InvalidSnapshot {
        /// The period label of the snapshot.
        period: String,
        /// The reason the snapshot is invalid.
        reason: String,
    },
}

impl CoreError {
    /// Create an invalid period error.
    #[must_use]
    pub fn invalid_period(label: impl Into<String>) -> Self {
        Self::InvalidPeriod {
            label: label.into(),
        }
    }

    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid position error.
    #[must_use]
    pub fn invalid_position(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPosition {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid snapshot error.
    #[must_use]
    pub fn invalid_snapshot(period: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            period: period.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_period("2025Q5");
        assert!(err.to_string().contains("2025Q5"));

        let err = CoreError::missing_field("identifier");
        assert!(err.to_string().contains("identifier"));

        let err = CoreError::invalid_position("037833100", "shares cannot be negative");
        assert!(err.to_string().contains("037833100"));
        assert!(err.to_string().contains("shares cannot be negative"));
    }

    #[test]
    fn test_error_clone() {
        let err = CoreError::invalid_snapshot("Q1 2025", "duplicate period");
        let cloned = err.clone();
        assert_eq!(err, cloned);
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
