//! Error types for the analytics engine.
//!
//! Analytics computations themselves never fail: missing history is treated
//! as a first filing and zero denominators yield zero or null. Errors come
//! only from configuration and from validating injected data.

use holdwise_core::CoreError;
use thiserror::Error;

/// Result type for analytics setup operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors raised while configuring the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// A configuration value is out of range.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A configuration document could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        /// Parser error message.
        message: String,
    },

    /// A configuration file could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// Injected data failed validation.
    #[error(transparent)]
    Data(#[from] CoreError),
}

impl AnalyticsError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration parse error.
    #[must_use]
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    #[must_use]
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<toml::de::Error> for AnalyticsError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::invalid_config("concentration", "bands inverted");
        assert!(err.to_string().contains("concentration"));
        assert!(err.to_string().contains("bands inverted"));

        let err = AnalyticsError::io("engine.toml", "not found");
        assert!(err.to_string().contains("engine.toml"));
    }

    #[test]
    fn test_from_core_error() {
        let err: AnalyticsError = CoreError::missing_field("slug").into();
        assert!(matches!(err, AnalyticsError::Data(_)));
        assert!(err.to_string().contains("slug"));
    }
}
