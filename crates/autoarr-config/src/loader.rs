//! Settings document loading.
//!
//! # Design
//! - A document is parsed, validated, then checked against the environment; any failure aborts
//!   before the download client is contacted.

use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::{MoverKind, Settings};
use crate::validate::validate;

/// Load, validate and environment-check the settings document at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Parse`] for
/// malformed JSON, and the validation errors of [`validate`] and [`check_environment`].
pub async fn load(path: &Path) -> ConfigResult<Settings> {
    let document = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            operation: "settings.read",
            path: path.to_path_buf(),
            source,
        })?;
    let settings = parse(&document, path)?;
    check_environment(&settings).await?;
    info!(
        path = %path.display(),
        pool_size_gb = settings.pool_size,
        sort_field = %settings.sort_field,
        mover = settings.mover.as_str(),
        remote = settings.remote().unwrap_or(""),
        "settings loaded"
    );
    Ok(settings)
}

/// Parse and validate a settings document; `origin` is only used for error context.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed JSON and the errors of [`validate`].
pub fn parse(document: &str, origin: &Path) -> ConfigResult<Settings> {
    let settings: Settings =
        serde_json::from_str(document).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
    validate(&settings)?;
    Ok(settings)
}

/// Check that external resources named by the settings exist.
///
/// # Errors
///
/// Returns [`ConfigError::RcloneConfigMissing`] when a remote idle tier is configured without
/// an rclone configuration file.
pub async fn check_environment(settings: &Settings) -> ConfigResult<()> {
    if settings.remote().is_none() || settings.mover != MoverKind::Rclone {
        return Ok(());
    }
    let path = settings.rclone_config_path.as_path();
    match fs::metadata(path).await {
        Ok(meta) if meta.is_file() => {
            debug!(path = %path.display(), "rclone configuration found");
            Ok(())
        }
        Ok(_) => Err(ConfigError::RcloneConfigMissing {
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ConfigError::RcloneConfigMissing {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ConfigError::Io {
            operation: "rclone_config.metadata",
            path: path.to_path_buf(),
            source,
        }),
    }
}
