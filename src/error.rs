//! Error types shared across the simulator.

use thiserror::Error;

use crate::weather::WeatherError;

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors that reject a run before any hour is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("expected {expected} hourly inputs, got {actual}")]
    HourCount { expected: usize, actual: usize },

    #[error("invalid hourly input at index {index}: {field} {message}")]
    InvalidInput {
        index: usize,
        field: &'static str,
        message: String,
    },
}

/// Errors from preparing or executing a full scenario run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid scenario: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),

    #[error(transparent)]
    Weather(#[from] WeatherError),

    #[error(transparent)]
    Sim(#[from] SimError),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}
