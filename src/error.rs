//! # Error Types
//!
//! Custom error types for the stick conditioner using `thiserror`.

use thiserror::Error;

/// Main error type for the stick conditioner
#[derive(Debug, Error)]
pub enum ConditionerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Calibration store encoding errors
    #[error("Calibration store encoding error: {0}")]
    StoreEncoding(#[from] serde_json::Error),

    /// Calibration store rejected a write
    #[error("Calibration store write failed for key '{key}': {reason}")]
    StoreWrite { key: String, reason: String },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the stick conditioner
pub type Result<T> = std::result::Result<T, ConditionerError>;
