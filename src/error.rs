//! Error types shared by the graph, routing and cluster components.

use thiserror::Error;

/// Errors raised by the simulation core and its drivers.
///
/// Terminal simulation outcomes (path found, search exhausted, death
/// threshold reached) are reported through state, never through this type.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("No connected topology after {attempts} attempts")]
    ConnectivityNotReached { attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SimError::Configuration(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        SimError::InvalidState(msg.into())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(err.to_string())
    }
}
