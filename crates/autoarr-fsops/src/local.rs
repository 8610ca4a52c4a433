//! Local-filesystem payload mover.
//!
//! # Design
//! - Blocking tree walks run on the tokio blocking pool.
//! - Moves try a rename first and fall back to copy-then-remove across devices.
//! - Remote (`remote:/path`) locations are rejected; they need the rclone mover.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use autoarr_core::{FileMigrator, TransferMode};
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// Whether a location uses rclone's `remote:path` syntax.
#[must_use]
pub fn is_remote_path(location: &str) -> bool {
    if location.starts_with('/') || location.starts_with('.') {
        return false;
    }
    location
        .split_once(':')
        .is_some_and(|(remote, _)| !remote.is_empty() && !remote.contains('/'))
}

/// Mover that copies, renames and deletes payloads on locally mounted tiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalMover {
    dry_run: bool,
}

impl LocalMover {
    /// Construct a mover; in dry-run mode operations are logged and skipped.
    #[must_use]
    pub const fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Transfer a payload between local paths.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] for remote locations, [`FsOpsError::Io`] when the
    /// source is missing or the copy fails, and [`FsOpsError::Join`] if the blocking task dies.
    pub async fn transfer_local(&self, from: &str, to: &str, mode: TransferMode) -> FsOpsResult<()> {
        let source = local_path("from", from)?;
        let destination = local_path("to", to)?;
        if self.dry_run {
            info!(from, to, mode = mode.as_str(), "dry run: skipping local transfer");
            return Ok(());
        }

        debug!(from, to, mode = mode.as_str(), "transferring payload");
        run_blocking("transfer", move || {
            if !source.exists() {
                return Err(FsOpsError::io(
                    "transfer.source",
                    &source,
                    io::Error::from(io::ErrorKind::NotFound),
                ));
            }
            match mode {
                TransferMode::Copy => copy_tree(&source, &destination),
                TransferMode::Move => move_tree(&source, &destination),
            }
        })
        .await
    }

    /// Remove a local payload; a missing path counts as purged.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::InvalidInput`] for remote locations and [`FsOpsError::Io`] when
    /// removal fails.
    pub async fn purge_local(&self, location: &str) -> FsOpsResult<()> {
        let path = local_path("path", location)?;
        if self.dry_run {
            info!(path = location, "dry run: skipping local purge");
            return Ok(());
        }

        debug!(path = location, "purging payload");
        run_blocking("purge", move || remove_tree(&path)).await
    }
}

#[async_trait]
impl FileMigrator for LocalMover {
    async fn transfer(&self, from: &str, to: &str, mode: TransferMode) -> anyhow::Result<()> {
        self.transfer_local(from, to, mode).await?;
        Ok(())
    }

    async fn purge(&self, path: &str) -> anyhow::Result<()> {
        self.purge_local(path).await?;
        Ok(())
    }
}

fn local_path(field: &'static str, location: &str) -> FsOpsResult<PathBuf> {
    if location.trim().is_empty() {
        return Err(FsOpsError::InvalidInput {
            field,
            reason: "empty_path",
            value: None,
        });
    }
    if is_remote_path(location) {
        return Err(FsOpsError::InvalidInput {
            field,
            reason: "remote_path",
            value: Some(location.to_string()),
        });
    }
    Ok(PathBuf::from(location))
}

async fn run_blocking<F>(operation: &'static str, job: F) -> FsOpsResult<()>
where
    F: FnOnce() -> FsOpsResult<()> + Send + 'static,
{
    task::spawn_blocking(job)
        .await
        .map_err(|source| FsOpsError::Join { operation, source })?
}

fn copy_tree(source: &Path, destination: &Path) -> FsOpsResult<()> {
    if source.is_file() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|source_err| {
                FsOpsError::io("copy_tree.create_parent", parent, source_err)
            })?;
        }
        fs::copy(source, destination)
            .map_err(|source_err| FsOpsError::io("copy_tree.copy_file", destination, source_err))?;
        return Ok(());
    }

    fs::create_dir_all(destination)
        .map_err(|source_err| FsOpsError::io("copy_tree.create_dir", destination, source_err))?;

    for entry in WalkDir::new(source) {
        let entry =
            entry.map_err(|source_err| FsOpsError::walkdir("copy_tree.walk", source, source_err))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| FsOpsError::InvalidInput {
                field: "source_path",
                reason: "strip_prefix",
                value: Some(entry.path().to_string_lossy().into_owned()),
            })?;
        let target_path = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).map_err(|source_err| {
                FsOpsError::io("copy_tree.create_dir", &target_path, source_err)
            })?;
        } else {
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent).map_err(|source_err| {
                    FsOpsError::io("copy_tree.create_parent", parent, source_err)
                })?;
            }
            fs::copy(entry.path(), &target_path).map_err(|source_err| {
                FsOpsError::io("copy_tree.copy_entry", &target_path, source_err)
            })?;
        }
    }

    Ok(())
}

fn move_tree(source: &Path, destination: &Path) -> FsOpsResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|source_err| FsOpsError::io("move_tree.create_parent", parent, source_err))?;
    }
    if fs::rename(source, destination).is_ok() {
        return Ok(());
    }
    copy_tree(source, destination)?;
    remove_tree(source).map_err(|err| match err {
        FsOpsError::Io { path, source, .. } => FsOpsError::Io {
            operation: "move_tree.cleanup",
            path,
            source,
        },
        other => other,
    })
}

fn remove_tree(path: &Path) -> FsOpsResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "purge target already absent");
            return Ok(());
        }
        Err(err) => return Err(FsOpsError::io("purge.metadata", path, err)),
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(FsOpsError::io("purge.remove", path, err)),
    }
}
