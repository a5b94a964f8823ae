//! Error types for the simulation harness.

use blackhole_env::EnvError;
use thiserror::Error;

/// Errors raised while setting up or exporting a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Bomb description rejected by the environment layer
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Scenario name not recognized
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// Configuration cannot describe a playable bomb
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading a config file or writing an export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
