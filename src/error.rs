//! Custom error types for auto-clicker.
//!
//! Configuration problems fail fast when a worker or config is built.
//! Capability failures come from the platform input backend and end the
//! worker that hit them.

use std::io;
use thiserror::Error;

/// Main error type for auto-clicker operations.
#[derive(Error, Debug)]
pub enum ClickerError {
    /// Clicks-per-second rate is zero, negative or not a finite number.
    #[error("invalid rate {rate}: must be a finite number greater than zero")]
    InvalidRate { rate: f64 },

    /// Button name does not map to primary, secondary or middle.
    #[error("unrecognized mouse button '{value}'")]
    InvalidButton { value: String },

    /// Action mode name is neither click nor hold.
    #[error("unrecognized action mode '{value}'")]
    InvalidMode { value: String },

    /// The specified key identifier is invalid or unsupported.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// A call into the input capability failed.
    #[error("input capability '{operation}' failed: {reason}")]
    Capability { operation: String, reason: String },

    /// Configuration validation error.
    #[error("configuration error: {0}")]
    ConfigValidation(String),

    /// Error reading or parsing configuration file.
    #[error("failed to load config from '{path}': {reason}")]
    ConfigLoad { path: String, reason: String },

    /// Error parsing duration string.
    #[error("invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// Platform-specific operation is not supported.
    #[error("operation not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for auto-clicker operations.
pub type Result<T> = std::result::Result<T, ClickerError>;

impl ClickerError {
    pub fn invalid_rate(rate: f64) -> Self {
        Self::InvalidRate { rate }
    }

    pub fn invalid_button(value: impl Into<String>) -> Self {
        Self::InvalidButton {
            value: value.into(),
        }
    }

    pub fn invalid_mode(value: impl Into<String>) -> Self {
        Self::InvalidMode {
            value: value.into(),
        }
    }

    /// Create a new InvalidKey error.
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Capability error for the named backend call.
    pub fn capability(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Capability {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a new ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create a new ConfigLoad error.
    pub fn config_load(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new InvalidDuration error.
    pub fn invalid_duration(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDuration {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new UnsupportedPlatform error.
    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(message.into())
    }
}
