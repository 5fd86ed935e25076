//! Error types for bitrate-ladder operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bitrate-ladder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a ladder or handling its inputs and outputs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A sample failed validation before any computation ran.
    #[error("Invalid sample '{id}': {field} {reason}")]
    Validation {
        /// Identifier of the offending sample.
        id: String,
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with the value.
        reason: String,
    },

    /// No samples were supplied.
    #[error("At least one sample is required")]
    EmptyInput,

    /// The assembled ladder broke a monotonicity invariant.
    ///
    /// This signals a defect in the selector, never a user error.
    #[error("Ladder invariant violated: {0}")]
    InvariantViolation(String),

    /// Invalid configuration or selection options.
    #[error("Config error: {0}")]
    Config(String),

    /// A VMAF log could not be read or pooled.
    #[error("VMAF log error: {path}: {reason}")]
    VmafLog {
        /// Path of the log.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Error importing CSV data.
    #[error("CSV import error at line {line}: {reason}")]
    CsvImport {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// Chart generation failed.
    #[error("Plot error: {0}")]
    Plot(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] on a sample field.
    pub(crate) fn invalid(id: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            id: id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}
