//! Error types for the Lethe demonstration crate
//!
//! This module provides structured error handling using thiserror for
//! error definitions and anyhow for propagation at the CLI edge.
//!
//! The exception raised inside a trial loop is expected control flow and
//! never surfaces as a [`LetheError`]; only capability and configuration
//! failures do.

use thiserror::Error;

/// Main error type for Lethe operations
#[derive(Error, Debug)]
pub enum LetheError {
    /// The host cannot report process memory or the probe failed mid-trial
    #[error("Memory introspection unavailable: {0}")]
    CapabilityUnavailable(String),

    /// Trial configuration rejected before any raise occurs
    #[error("Invalid trial configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (artifact writing)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error (artifact encoding)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Lethe operations
pub type Result<T> = std::result::Result<T, LetheError>;

/// Convert anyhow::Error to LetheError
impl From<anyhow::Error> for LetheError {
    fn from(err: anyhow::Error) -> Self {
        LetheError::Other(err.to_string())
    }
}
