//! Error types for settings loading and validation.

use std::io;
use std::path::PathBuf;

use autoarr_core::CoreError;
use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Settings key that failed validation.
        field: &'static str,
        /// Offending value when available.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A remote idle tier is configured but rclone has no configuration file.
    #[error("rclone configuration file not found")]
    RcloneConfigMissing {
        /// Path that was checked.
        path: PathBuf,
    },
    /// Settings document was not valid JSON for the expected shape.
    #[error("failed to parse settings document")]
    Parse {
        /// Document location.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// The settings could not be turned into a valid pool policy.
    #[error("invalid pool policy")]
    Policy {
        /// Source policy error.
        source: CoreError,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the operation.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) const fn invalid(
        field: &'static str,
        value: Option<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value,
            reason,
        }
    }
}

impl From<CoreError> for ConfigError {
    fn from(source: CoreError) -> Self {
        Self::Policy { source }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn policy_error_keeps_core_source() {
        let err = ConfigError::from(CoreError::InvalidPolicy {
            field: "budget_bytes",
            reason: "must be greater than zero",
            value: None,
        });
        assert_eq!(err.to_string(), "invalid pool policy");
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("budget_bytes"));
    }

    #[test]
    fn invalid_field_carries_context() {
        let err = ConfigError::invalid("PoolSize", Some("-1".to_string()), "must be positive");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "PoolSize",
                reason: "must be positive",
                ..
            }
        ));
    }
}
