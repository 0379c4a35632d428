//! Tuner-specific error types

use thiserror::Error;

use oracles::OracleError;
use shared::{CaseId, SharedError};

#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Service call failed: {0}")]
    TransientService(#[from] OracleError),

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Template skeleton violation: {reason}")]
    SkeletonViolation { reason: String },

    #[error("Case {case_id} is incomplete: {reason}")]
    DataIntegrity { case_id: CaseId, reason: String },

    #[error("Initialization failed: {reason}")]
    FatalInitialization { reason: String },

    #[error("File operation failed: {operation} on {path}")]
    FileSystemError {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl TunerError {
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::FatalInitialization { reason: reason.into() }
    }

    pub fn skeleton(reason: impl Into<String>) -> Self {
        Self::SkeletonViolation { reason: reason.into() }
    }

    pub fn integrity(case_id: &CaseId, reason: impl Into<String>) -> Self {
        Self::DataIntegrity {
            case_id: case_id.clone(),
            reason: reason.into(),
        }
    }

    pub fn file(operation: &str, path: &std::path::Path, source: std::io::Error) -> Self {
        Self::FileSystemError {
            operation: operation.to_string(),
            path: path.display().to_string(),
            source,
        }
    }
}

pub type TunerResult<T> = Result<T, TunerError>;
