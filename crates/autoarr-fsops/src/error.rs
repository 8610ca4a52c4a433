//! # Design
//!
//! - Provide structured, constant-message errors for payload migration.
//! - Capture operation context (paths, programs, arguments) to make failures reproducible.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while migrating or purging payloads.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// External program could not be started.
    #[error("fsops command spawn failure")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// External program exited unsuccessfully.
    #[error("fsops command failed")]
    CommandFailed {
        /// Program that was run.
        program: String,
        /// Arguments passed to the program.
        args: Vec<String>,
        /// Exit code, absent when terminated by a signal.
        status: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// Blocking filesystem task panicked or was cancelled.
    #[error("fsops blocking task failure")]
    Join {
        /// Operation that was running on the blocking pool.
        operation: &'static str,
        /// Underlying join error.
        source: tokio::task::JoinError,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_helper_keeps_context_and_source() {
        let err = FsOpsError::io("purge.remove", "/active/item", io::Error::other("denied"));
        assert_eq!(err.to_string(), "fsops io failure");
        assert!(err.source().is_some());
        assert!(matches!(
            err,
            FsOpsError::Io {
                operation: "purge.remove",
                ref path,
                ..
            } if path == &PathBuf::from("/active/item")
        ));
    }

    #[test]
    fn command_failure_has_constant_message() {
        let err = FsOpsError::CommandFailed {
            program: "rclone".to_string(),
            args: vec!["purge".to_string(), "remote:/x".to_string()],
            status: Some(1),
            stderr: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "fsops command failed");
        assert!(err.source().is_none());
    }
}
