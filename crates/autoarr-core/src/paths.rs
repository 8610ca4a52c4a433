//! Tier path derivation for download payloads.

use serde::Serialize;

use crate::model::{Download, TierLayout};

/// Payload locations of one download on both tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierPaths {
    /// Location on the active (local) tier.
    pub active: String,
    /// Location on the idle tier; an rclone `remote:/path` when a remote is configured.
    pub idle: String,
}

impl TierPaths {
    /// Derive both tier locations for a download.
    #[must_use]
    pub fn for_download(download: &Download, default_save_path: &str, tiers: &TierLayout) -> Self {
        let relative = relative_path(&download.content_path, default_save_path);
        let idle = tiers.remote.as_deref().map_or_else(
            || join(&tiers.idle_root, relative),
            |remote| format!("{remote}:/{relative}"),
        );
        Self {
            active: join(&tiers.active_root, relative),
            idle,
        }
    }
}

/// Payload path relative to the client's default save directory.
///
/// Paths outside the save directory are kept whole apart from their leading separators.
#[must_use]
pub fn relative_path<'a>(content_path: &'a str, default_save_path: &str) -> &'a str {
    let stripped = if default_save_path.is_empty() {
        content_path
    } else {
        content_path
            .strip_prefix(default_save_path)
            .unwrap_or(content_path)
    };
    stripped.trim_start_matches('/')
}

fn join(root: &str, relative: &str) -> String {
    format!("{}/{relative}", root.trim_end_matches('/'))
}
