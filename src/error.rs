//! Error types for vorticity kernels.

use thiserror::Error;

/// Errors that can occur while configuring or running a kernel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VortexError {
    /// A required configuration field is missing, non-finite or out of range.
    #[error("Invalid configuration: {field}: {reason}")]
    Configuration { field: String, reason: String },

    /// The requested discretization is not implemented.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The elliptic solve could not produce a finite streamfunction.
    #[error("Streamfunction solve failed in {method} at step {step}: {reason}")]
    SolveFailure {
        method: &'static str,
        step: usize,
        reason: String,
    },

    /// Dimension mismatch between fields or operators.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },
}

impl VortexError {
    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a solve failure error.
    pub fn solve_failure(method: &'static str, step: usize, reason: impl Into<String>) -> Self {
        Self::SolveFailure {
            method,
            step,
            reason: reason.into(),
        }
    }

    /// Whether this error came from configuration checks (raised before any numerical work).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VortexError>;
