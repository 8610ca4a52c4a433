//! Typed settings document.
//!
//! # Design
//! - Keys are `PascalCase` so existing `input.json` files load unchanged.
//! - Every key is optional; missing keys fall back to [`Settings::default`] and required
//!   values are enforced by `validate.rs`.
//! - Conversion into the engine's `PoolPolicy` lives here so the core never sees raw settings.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use autoarr_core::{
    IgnoreRules, PatternRule, PoolPolicy, RemovalMode, RemovalRules, RemoveCondition, SortOrder,
    TierLayout,
};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    BYTES_PER_GIGABYTE, DEFAULT_ACTIVE_ROOT, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IDLE_ROOT,
    DEFAULT_LOG_FILE, DEFAULT_LOG_LEVEL, DEFAULT_RCLONE_BINARY, DEFAULT_RCLONE_CONFIG_PATH,
};
use crate::error::{ConfigError, ConfigResult};

/// One removal condition as written in the settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionSettings {
    /// Numeric download field to compare.
    pub field: String,
    /// Compare with `<` instead of `>`.
    #[serde(default)]
    pub invert: bool,
    /// Threshold; zero is rejected.
    #[serde(default)]
    pub value: f64,
}

/// Implementation used to migrate payloads between tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoverKind {
    /// Shell out to rclone.
    #[default]
    Rclone,
    /// Copy and rename on the local filesystem.
    Local,
}

impl MoverKind {
    /// Render the mover as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rclone => "rclone",
            Self::Local => "local",
        }
    }
}

impl FromStr for MoverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rclone" => Ok(Self::Rclone),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::invalid(
                "Mover",
                Some(other.to_string()),
                "expected 'rclone' or 'local'",
            )),
        }
    }
}

/// Output format requested for console logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Human-readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Settings document for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    /// qBittorrent Web UI base URL, without the `/api/v2` suffix.
    pub download_client_url: String,
    /// Active pool capacity in decimal gigabytes.
    pub pool_size: f64,
    /// Numeric field used to prioritize downloads.
    pub sort_field: String,
    /// Sort descending instead of ascending.
    pub sort_invert_order: bool,
    /// Name substring that ignores a download.
    pub ignore_by_name: String,
    /// Tag substring that ignores a download.
    pub ignore_by_tag: String,
    /// Category substring that ignores a download.
    pub ignore_by_category: String,
    /// Name substring required for a download to be managed.
    pub allow_by_name: String,
    /// Tag substring required for a download to be managed.
    pub allow_by_tag: String,
    /// Category substring required for a download to be managed.
    pub allow_by_category: String,
    /// Removal conditions in evaluation order.
    pub remove_conditions: Vec<ConditionSettings>,
    /// Combine removal conditions with OR instead of AND.
    pub remove_condition_inclusive: bool,
    /// Charge ignored downloads against the pool size.
    pub consider_ignored_in_pool_size: bool,
    /// Only remove candidates that no longer fit the pool.
    pub remove_only_when_pool_is_full: bool,
    /// Migrate payloads between tiers.
    pub use_stash: bool,
    /// Never delete payloads: stash by copy and skip removals.
    pub do_not_destroy_files: bool,
    /// Recheck payloads before resuming.
    pub recheck_on_resume: bool,
    /// Log file operations instead of performing them.
    pub do_not_change_files: bool,
    /// Log client requests that change state instead of sending them.
    pub do_not_change_download_client: bool,
    /// rclone remote holding the idle tier; empty keeps the idle tier local.
    pub rclone_remote: String,
    /// Root of the active tier.
    pub active_root: String,
    /// Root of the local idle tier.
    pub idle_root: String,
    /// rclone configuration file.
    pub rclone_config_path: PathBuf,
    /// rclone executable.
    pub rclone_binary: String,
    /// Payload mover implementation.
    pub mover: MoverKind,
    /// Download client request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Append-only log file; empty disables file logging.
    pub log_file: String,
    /// Log filter directive.
    pub log_level: String,
    /// Console log format; inferred from the build profile when absent.
    pub log_format: Option<LogFormatSetting>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_client_url: String::new(),
            pool_size: 0.0,
            sort_field: String::new(),
            sort_invert_order: false,
            ignore_by_name: String::new(),
            ignore_by_tag: String::new(),
            ignore_by_category: String::new(),
            allow_by_name: String::new(),
            allow_by_tag: String::new(),
            allow_by_category: String::new(),
            remove_conditions: Vec::new(),
            remove_condition_inclusive: false,
            consider_ignored_in_pool_size: false,
            remove_only_when_pool_is_full: false,
            use_stash: false,
            do_not_destroy_files: false,
            recheck_on_resume: false,
            do_not_change_files: false,
            do_not_change_download_client: false,
            rclone_remote: String::new(),
            active_root: DEFAULT_ACTIVE_ROOT.to_string(),
            idle_root: DEFAULT_IDLE_ROOT.to_string(),
            rclone_config_path: PathBuf::from(DEFAULT_RCLONE_CONFIG_PATH),
            rclone_binary: DEFAULT_RCLONE_BINARY.to_string(),
            mover: MoverKind::default(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: None,
        }
    }
}

impl Settings {
    /// Pool size converted to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the pool size is not a positive finite number
    /// or rounds to zero bytes.
    pub fn pool_bytes(&self) -> ConfigResult<u64> {
        let bytes = (self.pool_size * BYTES_PER_GIGABYTE).round();
        if !bytes.is_finite() || bytes < 1.0 {
            return Err(ConfigError::invalid(
                "PoolSize",
                Some(self.pool_size.to_string()),
                "must be a positive number of gigabytes",
            ));
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss
        )]
        let bytes = if bytes >= u64::MAX as f64 {
            u64::MAX
        } else {
            bytes as u64
        };
        Ok(bytes)
    }

    /// Remote name for the idle tier, if one is configured.
    #[must_use]
    pub fn remote(&self) -> Option<&str> {
        let remote = self.rclone_remote.trim();
        (!remote.is_empty()).then_some(remote)
    }

    /// Log file path, if file logging is enabled.
    #[must_use]
    pub fn log_file_path(&self) -> Option<PathBuf> {
        let path = self.log_file.trim();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Download client request timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Tier placement derived from the root and remote settings.
    #[must_use]
    pub fn tier_layout(&self) -> TierLayout {
        TierLayout {
            active_root: self.active_root.clone(),
            idle_root: self.idle_root.clone(),
            remote: self.remote().map(str::to_string),
        }
    }

    /// Build the engine policy and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for a bad pool size and [`ConfigError::Policy`]
    /// when the resulting policy is rejected by the engine.
    pub fn to_policy(&self) -> ConfigResult<PoolPolicy> {
        let mut policy = PoolPolicy::new(
            self.pool_bytes()?,
            SortOrder {
                field: self.sort_field.trim().to_string(),
                descending: self.sort_invert_order,
            },
        );
        policy.ignore = IgnoreRules {
            name: PatternRule::new(self.ignore_by_name.as_str(), self.allow_by_name.as_str()),
            tag: PatternRule::new(self.ignore_by_tag.as_str(), self.allow_by_tag.as_str()),
            category: PatternRule::new(
                self.ignore_by_category.as_str(),
                self.allow_by_category.as_str(),
            ),
        };
        policy.removal = RemovalRules {
            conditions: self
                .remove_conditions
                .iter()
                .map(|condition| RemoveCondition {
                    field: condition.field.trim().to_string(),
                    invert: condition.invert,
                    threshold: condition.value,
                })
                .collect(),
            mode: if self.remove_condition_inclusive {
                RemovalMode::Inclusive
            } else {
                RemovalMode::Exclusive
            },
        };
        policy.count_ignored_in_budget = self.consider_ignored_in_pool_size;
        policy.remove_only_when_full = self.remove_only_when_pool_is_full;
        policy.use_stash = self.use_stash;
        policy.preserve_files = self.do_not_destroy_files;
        policy.recheck_on_resume = self.recheck_on_resume;
        policy.tiers = self.tier_layout();

        policy.validate()?;
        Ok(policy)
    }
}
