//! Error types for the pool decision engine.

use thiserror::Error;

/// Primary error type for decision passes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A download lacks a numeric field referenced by the pool policy.
    #[error("download '{download_id}' has no numeric field '{field}'")]
    MissingField {
        /// Identifier (hash) of the offending download.
        download_id: String,
        /// Field name referenced by the policy.
        field: String,
    },
    /// The pool policy failed validation.
    #[error("invalid pool policy field '{field}': {reason}")]
    InvalidPolicy {
        /// Policy field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl CoreError {
    pub(crate) fn missing_field(download_id: &str, field: &str) -> Self {
        Self::MissingField {
            download_id: download_id.to_string(),
            field: field.to_string(),
        }
    }
}

/// Convenience alias for decision results.
pub type CoreResult<T> = Result<T, CoreError>;
