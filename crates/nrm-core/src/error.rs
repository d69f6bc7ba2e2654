//! Error types for NRM operations.
//!
//! Only misconfiguration is fatal inside the kernel. Numerical edge cases
//! inside a step degrade to neutral values and never surface here; the
//! remaining variants belong to the I/O edges (summaries, event logs).

use thiserror::Error;

/// Result type for NRM operations.
pub type Result<T> = std::result::Result<T, NrmError>;

/// Errors that can occur around a simulation run.
#[derive(Debug, Error)]
pub enum NrmError {
    /// The swarm configuration was rejected at construction.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Event log or summary store failures.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value that is not acceptable for its field.
    #[error("invalid value for {field}: {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// A numeric value outside its closed range.
    #[error("{field} out of range: {value} (must be {min}..={max})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },
}

// Convenience constructors
impl NrmError {
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        NrmError::Config(ConfigError::InvalidValue {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        })
    }

    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, value: f64) -> Self {
        NrmError::Config(ConfigError::OutOfRange {
            field: field.into(),
            min,
            max,
            value,
        })
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        NrmError::Persistence(msg.into())
    }

    /// Whether this error came from configuration validation.
    pub fn is_config(&self) -> bool {
        matches!(self, NrmError::Config(_))
    }
}
