//! Error types for the Black Hole environment abstraction.

use thiserror::Error;

/// Errors that can occur when describing a bomb to the core.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// Serial number does not have the expected shape
    #[error("Invalid serial number {serial:?}: {reason}")]
    InvalidSerial {
        serial: String,
        reason: String,
    },

    /// Edgework description could not be interpreted
    #[error("Invalid edgework: {0}")]
    InvalidEdgework(String),
}

impl EnvError {
    /// Creates a serial number error.
    pub fn serial(serial: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSerial {
            serial: serial.into(),
            reason: reason.into(),
        }
    }

    /// Creates an edgework error.
    pub fn edgework(msg: impl Into<String>) -> Self {
        Self::InvalidEdgework(msg.into())
    }
}
