//! Validation helpers for settings documents.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{MoverKind, Settings};

/// Validate a settings document without touching the filesystem.
///
/// Sort and removal rules are checked by the engine when the pool policy is derived.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for the first offending settings key, or
/// [`ConfigError::Policy`] when the derived pool policy is rejected.
pub fn validate(settings: &Settings) -> ConfigResult<()> {
    parse_client_url(&settings.download_client_url)?;
    settings.pool_bytes()?;

    if settings.http_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "HttpTimeoutSecs",
            Some("0".to_string()),
            "must be greater than zero",
        ));
    }
    if settings.mover == MoverKind::Local && settings.remote().is_some() {
        return Err(ConfigError::invalid(
            "Mover",
            Some(settings.mover.as_str().to_string()),
            "local mover cannot reach an rclone remote",
        ));
    }
    if settings.mover == MoverKind::Rclone && settings.rclone_binary.trim().is_empty() {
        return Err(ConfigError::invalid(
            "RcloneBinary",
            None,
            "must not be empty",
        ));
    }

    settings.to_policy().map(drop)
}

/// Parse the download client base URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is empty, unparseable, or not HTTP(S).
pub fn parse_client_url(raw: &str) -> ConfigResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::invalid(
            "DownloadClientUrl",
            None,
            "must not be empty",
        ));
    }
    let url = Url::parse(trimmed).map_err(|_| {
        ConfigError::invalid(
            "DownloadClientUrl",
            Some(trimmed.to_string()),
            "must be an absolute URL",
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            "DownloadClientUrl",
            Some(trimmed.to_string()),
            "must use http or https",
        ));
    }
    Ok(url)
}
