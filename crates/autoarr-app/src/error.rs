//! # Design
//!
//! - Centralize application-level errors for bootstrap and run orchestration.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Map every failure to a process exit code: 2 for configuration, 3 for run failures.

use std::error::Error as _;
use std::fmt::Write as _;

use autoarr_config::ConfigError;
use autoarr_core::CoreError;
use autoarr_telemetry::TelemetryError;
use thiserror::Error;

/// Exit code for configuration and validation failures.
pub const EXIT_CONFIG: i32 = 2;
/// Exit code for failures while fetching, deciding or applying.
pub const EXIT_FAILURE: i32 = 3;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Settings could not be loaded or validated.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: ConfigError,
    },
    /// Logging could not be initialised.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: TelemetryError,
    },
    /// Building a collaborator failed.
    #[error("collaborator setup failed")]
    Setup {
        /// Collaborator identifier.
        operation: &'static str,
        /// Source error.
        source: anyhow::Error,
    },
    /// The download client snapshot could not be fetched.
    #[error("failed to fetch download client snapshot")]
    Snapshot {
        /// Source collaborator error.
        source: anyhow::Error,
    },
    /// The decision pass rejected the snapshot.
    #[error("decision pass failed")]
    Engine {
        /// Operation identifier.
        operation: &'static str,
        /// Source engine error.
        source: CoreError,
    },
    /// The plan could not be rendered.
    #[error("failed to render plan")]
    Render {
        /// Source serialisation error.
        source: serde_json::Error,
    },
    /// One or more downloads failed while applying the plan.
    #[error("run finished with failed downloads")]
    RunFailed {
        /// Number of downloads whose actions did not all succeed.
        failed: usize,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) fn setup(operation: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Setup {
            operation,
            source: source.into(),
        }
    }

    /// Process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => EXIT_CONFIG,
            Self::Telemetry { .. }
            | Self::Setup { .. }
            | Self::Snapshot { .. }
            | Self::Engine { .. }
            | Self::Render { .. }
            | Self::RunFailed { .. } => EXIT_FAILURE,
        }
    }

    /// One-line message for the terminal: the error chain plus the offending field, if any.
    #[must_use]
    pub fn display_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(error) = source {
            message.push_str(": ");
            message.push_str(&error.to_string());
            source = error.source();
        }
        match self {
            Self::Config {
                source:
                    ConfigError::InvalidField {
                        field,
                        reason,
                        value,
                    },
                ..
            } => {
                let _ = write!(message, " ({field} {reason}");
                if let Some(value) = value {
                    let _ = write!(message, ", got '{value}'");
                }
                message.push(')');
            }
            Self::Config {
                source: ConfigError::RcloneConfigMissing { path },
                ..
            } => {
                let _ = write!(message, " ({})", path.display());
            }
            Self::RunFailed { failed } => {
                let _ = write!(message, " ({failed})");
            }
            _ => {}
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn configuration_errors_exit_with_two() {
        let err = AppError::config(
            "settings.load",
            ConfigError::InvalidField {
                field: "PoolSize",
                value: Some("0".to_string()),
                reason: "must be a positive number of gigabytes",
            },
        );
        assert_eq!(err.exit_code(), EXIT_CONFIG);
        assert_eq!(
            err.display_message(),
            "configuration operation failed: invalid configuration field \
             (PoolSize must be a positive number of gigabytes, got '0')"
        );
    }

    #[test]
    fn missing_rclone_config_names_the_path() {
        let err = AppError::config(
            "settings.load",
            ConfigError::RcloneConfigMissing {
                path: PathBuf::from("/rclone.conf"),
            },
        );
        assert!(err.display_message().ends_with("(/rclone.conf)"));
    }

    #[test]
    fn run_errors_exit_with_three_and_keep_the_chain() {
        let err = AppError::Snapshot {
            source: anyhow::anyhow!("connection refused").context("torrents.info"),
        };
        assert_eq!(err.exit_code(), EXIT_FAILURE);
        assert_eq!(
            err.display_message(),
            "failed to fetch download client snapshot: torrents.info: connection refused"
        );

        let failed = AppError::RunFailed { failed: 2 };
        assert_eq!(failed.exit_code(), EXIT_FAILURE);
        assert_eq!(
            failed.display_message(),
            "run finished with failed downloads (2)"
        );
    }

    #[test]
    fn setup_wraps_any_error() {
        let err = AppError::setup("qbit.client", std::io::Error::other("bad url"));
        assert!(matches!(err, AppError::Setup { .. }));
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }
}
