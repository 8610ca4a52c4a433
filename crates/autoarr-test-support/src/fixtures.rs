//! Download and policy fixtures.

use autoarr_core::{Download, FieldMap, PoolPolicy, Snapshot, SortOrder};

/// Save path used by every fixture snapshot.
pub const SAVE_PATH: &str = "/downloads";

/// Builder for [`Download`] values with sensible defaults.
///
/// The payload lives under [`SAVE_PATH`] and `size` is also exposed as the `size` field so it can
/// drive sorting without extra setup.
#[derive(Debug, Clone)]
pub struct DownloadBuilder {
    download: Download,
}

impl DownloadBuilder {
    /// Start a download named after `id`.
    #[must_use]
    pub fn new(id: &str, size: u64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let size_field = size as f64;
        let mut fields = FieldMap::new();
        fields.insert("size", size_field);
        Self {
            download: Download {
                id: id.to_string(),
                name: format!("Download {id}"),
                category: String::new(),
                tags: String::new(),
                content_path: format!("{SAVE_PATH}/{id}"),
                size,
                active: true,
                fields,
            },
        }
    }

    /// Mark the download as paused at the client.
    #[must_use]
    pub const fn paused(mut self) -> Self {
        self.download.active = false;
        self
    }

    /// Override the display name.
    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.download.name = name.to_string();
        self
    }

    /// Override the category.
    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.download.category = category.to_string();
        self
    }

    /// Override the raw tag string.
    #[must_use]
    pub fn tags(mut self, tags: &str) -> Self {
        self.download.tags = tags.to_string();
        self
    }

    /// Add or replace a numeric field.
    #[must_use]
    pub fn field(mut self, name: &str, value: f64) -> Self {
        self.download.fields.insert(name, value);
        self
    }

    /// Finish the download.
    #[must_use]
    pub fn build(self) -> Download {
        self.download
    }
}

/// Snapshot rooted at [`SAVE_PATH`].
#[must_use]
pub fn snapshot(downloads: Vec<Download>) -> Snapshot {
    Snapshot {
        default_save_path: SAVE_PATH.to_string(),
        downloads,
    }
}

/// Policy sorting by `size` descending with every optional behaviour off.
#[must_use]
pub fn size_policy(budget_bytes: u64) -> PoolPolicy {
    PoolPolicy::new(
        budget_bytes,
        SortOrder {
            field: "size".to_string(),
            descending: true,
        },
    )
}
