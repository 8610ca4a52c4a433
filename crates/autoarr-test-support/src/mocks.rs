//! Recording fakes for the engine's collaborator traits.
//!
//! Every call is appended to a shared journal as a short text line (`"pause abc"`,
//! `"move /active/a -> /idle/a"`), so tests can assert on the exact cross-collaborator order.
//! A call whose line starts with a configured prefix fails instead of being recorded.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use autoarr_core::{DownloadControl, FileMigrator, Snapshot, SnapshotSource, TransferMode};

/// Shared, ordered record of collaborator calls.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    calls: Arc<Mutex<Vec<String>>>,
    failures: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call whose journal line starts with `prefix` fail.
    pub fn fail_on(&self, prefix: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(prefix.to_string());
        }
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, line: String) -> anyhow::Result<()> {
        let failing = self
            .failures
            .lock()
            .map_err(|_| anyhow!("journal poisoned"))?
            .iter()
            .any(|prefix| line.starts_with(prefix.as_str()));
        if failing {
            bail!("injected failure: {line}");
        }
        self.calls
            .lock()
            .map_err(|_| anyhow!("journal poisoned"))?
            .push(line);
        Ok(())
    }
}

/// [`DownloadControl`] fake recording into a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingControl {
    journal: Journal,
}

impl RecordingControl {
    /// Record into `journal`.
    #[must_use]
    pub const fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl DownloadControl for RecordingControl {
    async fn pause(&self, id: &str) -> anyhow::Result<()> {
        self.journal.record(format!("pause {id}"))
    }

    async fn resume(&self, id: &str) -> anyhow::Result<()> {
        self.journal.record(format!("resume {id}"))
    }

    async fn delete(&self, id: &str, delete_files: bool) -> anyhow::Result<()> {
        self.journal
            .record(format!("delete {id} files={delete_files}"))
    }

    async fn recheck(&self, id: &str) -> anyhow::Result<()> {
        self.journal.record(format!("recheck {id}"))
    }

    async fn reannounce(&self, id: &str) -> anyhow::Result<()> {
        self.journal.record(format!("reannounce {id}"))
    }
}

/// [`FileMigrator`] fake recording into a [`Journal`].
#[derive(Debug, Clone)]
pub struct RecordingMigrator {
    journal: Journal,
}

impl RecordingMigrator {
    /// Record into `journal`.
    #[must_use]
    pub const fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl FileMigrator for RecordingMigrator {
    async fn transfer(&self, from: &str, to: &str, mode: TransferMode) -> anyhow::Result<()> {
        self.journal
            .record(format!("{} {from} -> {to}", mode.as_str()))
    }

    async fn purge(&self, path: &str) -> anyhow::Result<()> {
        self.journal.record(format!("purge {path}"))
    }
}

/// [`SnapshotSource`] returning a fixed snapshot.
#[derive(Debug, Clone)]
pub struct StaticSnapshot {
    snapshot: Snapshot,
}

impl StaticSnapshot {
    /// Serve `snapshot` on every call.
    #[must_use]
    pub const fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl SnapshotSource for StaticSnapshot {
    async fn snapshot(&self) -> anyhow::Result<Snapshot> {
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn journal_orders_calls_across_fakes() -> anyhow::Result<()> {
        let journal = Journal::new();
        let control = RecordingControl::new(journal.clone());
        let migrator = RecordingMigrator::new(journal.clone());

        control.pause("a").await?;
        migrator
            .transfer("/active/a", "/idle/a", TransferMode::Move)
            .await?;
        control.delete("a", true).await?;

        assert_eq!(
            journal.calls(),
            ["pause a", "move /active/a -> /idle/a", "delete a files=true"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn injected_failures_are_not_recorded() -> anyhow::Result<()> {
        let journal = Journal::new();
        journal.fail_on("purge /idle");
        let migrator = RecordingMigrator::new(journal.clone());

        assert!(migrator.purge("/idle/a").await.is_err());
        migrator.purge("/active/a").await?;
        assert_eq!(journal.calls(), ["purge /active/a"]);
        Ok(())
    }
}
