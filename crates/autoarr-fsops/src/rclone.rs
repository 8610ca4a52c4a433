//! rclone-backed payload mover.
//!
//! # Design
//! - Argument vectors are built by pure functions so they can be asserted without rclone.
//! - Purging a location rclone reports as missing (exit codes 3 and 4) counts as success.
//! - Transfers use `copyto`/`moveto` so `to` names the payload itself, for files and
//!   directories alike.

use std::path::PathBuf;
use std::process::Output;

use async_trait::async_trait;
use autoarr_core::{FileMigrator, TransferMode};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{FsOpsError, FsOpsResult};

/// rclone exit code for "directory not found".
const EXIT_DIRECTORY_NOT_FOUND: i32 = 3;
/// rclone exit code for "file not found".
const EXIT_FILE_NOT_FOUND: i32 = 4;

/// Mover that shells out to rclone; works for local paths and `remote:/path` locations alike.
#[derive(Debug, Clone)]
pub struct RcloneMover {
    binary: String,
    config: Option<PathBuf>,
    dry_run: bool,
}

impl RcloneMover {
    /// Construct a mover; in dry-run mode commands are logged and skipped.
    #[must_use]
    pub fn new(binary: impl Into<String>, config: Option<PathBuf>, dry_run: bool) -> Self {
        Self {
            binary: binary.into(),
            config,
            dry_run,
        }
    }

    /// Arguments for `rclone copyto|moveto <from> <to>`.
    #[must_use]
    pub fn transfer_args(&self, from: &str, to: &str, mode: TransferMode) -> Vec<String> {
        self.with_config(vec![
            transfer_verb(mode).to_string(),
            from.to_string(),
            to.to_string(),
        ])
    }

    /// Arguments for `rclone purge <path>`.
    #[must_use]
    pub fn purge_args(&self, path: &str) -> Vec<String> {
        self.with_config(vec!["purge".to_string(), path.to_string()])
    }

    /// Run `rclone copyto|moveto`.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Spawn`] when rclone cannot be started and
    /// [`FsOpsError::CommandFailed`] on a non-zero exit status.
    pub async fn run_transfer(&self, from: &str, to: &str, mode: TransferMode) -> FsOpsResult<()> {
        let args = self.transfer_args(from, to, mode);
        if self.skip(&args) {
            return Ok(());
        }
        let output = self.execute(&args).await?;
        self.check(args, &output)
    }

    /// Run `rclone purge`, treating a missing location as already purged.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Spawn`] when rclone cannot be started and
    /// [`FsOpsError::CommandFailed`] on any other non-zero exit status.
    pub async fn run_purge(&self, path: &str) -> FsOpsResult<()> {
        let args = self.purge_args(path);
        if self.skip(&args) {
            return Ok(());
        }
        let output = self.execute(&args).await?;
        if matches!(
            output.status.code(),
            Some(EXIT_DIRECTORY_NOT_FOUND | EXIT_FILE_NOT_FOUND)
        ) {
            debug!(path, "purge target already absent");
            return Ok(());
        }
        self.check(args, &output)
    }

    fn with_config(&self, mut args: Vec<String>) -> Vec<String> {
        if let Some(config) = &self.config {
            args.push("--config".to_string());
            args.push(config.display().to_string());
        }
        args
    }

    fn skip(&self, args: &[String]) -> bool {
        if self.dry_run {
            info!(
                program = %self.binary,
                args = %args.join(" "),
                "dry run: skipping rclone command"
            );
        }
        self.dry_run
    }

    async fn execute(&self, args: &[String]) -> FsOpsResult<Output> {
        debug!(program = %self.binary, args = %args.join(" "), "running rclone");
        Command::new(&self.binary)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| FsOpsError::Spawn {
                program: self.binary.clone(),
                source,
            })
    }

    fn check(&self, args: Vec<String>, output: &Output) -> FsOpsResult<()> {
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            program = %self.binary,
            args = %args.join(" "),
            status = ?output.status.code(),
            stderr = %stderr,
            "rclone command failed"
        );
        Err(FsOpsError::CommandFailed {
            program: self.binary.clone(),
            args,
            status: output.status.code(),
            stderr,
        })
    }
}

/// rclone subcommand for a path-to-path transfer.
const fn transfer_verb(mode: TransferMode) -> &'static str {
    match mode {
        TransferMode::Copy => "copyto",
        TransferMode::Move => "moveto",
    }
}

#[async_trait]
impl FileMigrator for RcloneMover {
    async fn transfer(&self, from: &str, to: &str, mode: TransferMode) -> anyhow::Result<()> {
        self.run_transfer(from, to, mode).await?;
        Ok(())
    }

    async fn purge(&self, path: &str) -> anyhow::Result<()> {
        self.run_purge(path).await?;
        Ok(())
    }
}
