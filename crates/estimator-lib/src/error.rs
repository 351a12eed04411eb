//! Error types for encoding, inference and startup

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Category of a per-request failure, as reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The caller supplied a value outside the allowed domain
    DomainError,
    /// The pipeline could not produce a usable estimate
    InferenceError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DomainError => "DomainError",
            ErrorKind::InferenceError => "InferenceError",
        }
    }
}

/// Per-request estimation failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// An input field failed domain validation
    #[error("{field}: {reason}")]
    Domain { field: &'static str, reason: String },

    /// Pipeline invocation failed or produced an unusable value
    #[error("inference failed: {0}")]
    Inference(String),
}

impl EstimateError {
    pub fn domain(field: &'static str, reason: impl Into<String>) -> Self {
        EstimateError::Domain {
            field,
            reason: reason.into(),
        }
    }

    pub fn inference(cause: impl Into<String>) -> Self {
        EstimateError::Inference(cause.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EstimateError::Domain { .. } => ErrorKind::DomainError,
            EstimateError::Inference(_) => ErrorKind::InferenceError,
        }
    }

    /// Name of the offending field for domain failures
    pub fn field(&self) -> Option<&'static str> {
        match self {
            EstimateError::Domain { field, .. } => Some(*field),
            EstimateError::Inference(_) => None,
        }
    }
}

/// Failure while loading the immutable state the estimator needs.
///
/// These are fatal: a process that hits one must not serve requests.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read {what} from {path:?}: {source}")]
    Io {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid option domains: {0}")]
    Domains(String),

    #[error("failed to load pipeline artifact: {0}")]
    Pipeline(String),

    #[error("pipeline artifact checksum mismatch: expected {expected}, got {actual}")]
    Checksum { expected: String, actual: String },
}
