//! Collaborator traits implemented by download-client and file-transfer adapters.

use anyhow::bail;
use async_trait::async_trait;

use crate::model::Snapshot;
use crate::plan::TransferMode;

/// Source of the observed download pool.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the default save path and every download in a controllable state.
    async fn snapshot(&self) -> anyhow::Result<Snapshot>;
}

/// Per-download control surface of the download client.
#[async_trait]
pub trait DownloadControl: Send + Sync {
    /// Pause a download.
    async fn pause(&self, id: &str) -> anyhow::Result<()>;

    /// Resume a paused download.
    async fn resume(&self, id: &str) -> anyhow::Result<()>;

    /// Delete a download, optionally with its files.
    async fn delete(&self, id: &str, delete_files: bool) -> anyhow::Result<()>;

    /// Force a recheck of on-disk data; default implementation reports lack of support.
    async fn recheck(&self, id: &str) -> anyhow::Result<()> {
        let _ = id;
        bail!("recheck not supported by this client");
    }

    /// Re-announce to trackers; default implementation reports lack of support.
    async fn reannounce(&self, id: &str) -> anyhow::Result<()> {
        let _ = id;
        bail!("reannounce not supported by this client");
    }
}

/// Moves payloads between the active and idle tiers.
#[async_trait]
pub trait FileMigrator: Send + Sync {
    /// Transfer `from` to `to`, keeping the source for [`TransferMode::Copy`].
    async fn transfer(&self, from: &str, to: &str, mode: TransferMode) -> anyhow::Result<()>;

    /// Remove a payload; a path that does not exist counts as purged.
    async fn purge(&self, path: &str) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubControl;

    #[async_trait]
    impl DownloadControl for StubControl {
        async fn pause(&self, _id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn resume(&self, _id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn delete(&self, _id: &str, _delete_files: bool) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn control_default_methods_error() {
        let control = StubControl;
        assert!(control.pause("abc").await.is_ok());
        assert!(
            control
                .recheck("abc")
                .await
                .expect_err("recheck should error")
                .to_string()
                .contains("recheck")
        );
        assert!(control.reannounce("abc").await.is_err());
    }
}
