//! Conversion of `torrents/info` entries into engine downloads.
//!
//! # Design
//! - Only seeding states are controllable: uploading ones count as active, stopped ones as
//!   paused; every other state is dropped before the engine sees it.
//! - Every numeric property is exposed as a sortable field, so any qBittorrent column can drive
//!   priority or removal rules.

use autoarr_core::{Download, FieldMap};
use serde_json::{Map, Value};

use crate::error::{QbitError, QbitResult};

/// Seeding state reported by qBittorrent, reduced to what the engine can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedState {
    /// `queuedUP`, `uploading` or `stalledUP`.
    Active,
    /// `pausedUP` or `missingFiles`.
    Paused,
}

impl SeedState {
    /// Map a wire state; `None` for states the engine does not manage.
    #[must_use]
    pub fn from_wire(state: &str) -> Option<Self> {
        match state {
            "queuedUP" | "uploading" | "stalledUP" => Some(Self::Active),
            "pausedUP" | "missingFiles" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// Parse a `torrents/info` body into downloads, dropping unmanaged states.
///
/// # Errors
///
/// Returns [`QbitError::Decode`] for invalid JSON and [`QbitError::MalformedTorrent`] when a
/// managed entry lacks a required field.
pub fn parse_torrent_list(body: &str) -> QbitResult<Vec<Download>> {
    let entries: Vec<Map<String, Value>> =
        serde_json::from_str(body).map_err(|source| QbitError::Decode {
            operation: "torrents.info",
            source,
        })?;

    let mut downloads = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let state = entry.get("state").and_then(Value::as_str).unwrap_or_default();
        let Some(seed_state) = SeedState::from_wire(state) else {
            continue;
        };
        downloads.push(to_download(index, entry, seed_state)?);
    }
    Ok(downloads)
}

fn to_download(index: usize, entry: &Map<String, Value>, state: SeedState) -> QbitResult<Download> {
    let text = |field: &'static str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(QbitError::MalformedTorrent { index, field })
    };
    let size = entry
        .get("total_size")
        .and_then(byte_count)
        .ok_or(QbitError::MalformedTorrent {
            index,
            field: "total_size",
        })?;

    Ok(Download {
        id: text("hash")?,
        name: text("name")?,
        category: text("category")?,
        tags: text("tags")?,
        content_path: text("content_path")?,
        size,
        active: state == SeedState::Active,
        fields: numeric_fields(entry),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn byte_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|bytes| bytes.is_finite() && *bytes >= 0.0)
            .map(|bytes| bytes.round() as u64)
    })
}

fn numeric_fields(entry: &Map<String, Value>) -> FieldMap {
    entry
        .iter()
        .filter_map(|(key, value)| value.as_f64().map(|number| (key.as_str(), number)))
        .collect()
}
