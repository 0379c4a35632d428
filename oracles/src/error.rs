//! Oracle error types

use thiserror::Error;

use crate::types::ApiFailure;

/// Result type for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Oracle error types
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last: ApiFailure,
    },

    #[error("{operation} rejected by service: {failure}")]
    Rejected { operation: String, failure: ApiFailure },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    ClientError(#[from] reqwest::Error),
}

impl OracleError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    /// The classified failure behind a service error, if any
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            OracleError::Exhausted { last, .. } => Some(last),
            OracleError::Rejected { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
