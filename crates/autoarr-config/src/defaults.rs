//! Default values for optional settings.
//!
//! # Design
//! - Defaults mirror the container layout the tool was first deployed with (`/config`,
//!   `/active`, `/idle`).

/// Settings document read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "/config/input.json";
/// Root of the active tier.
pub const DEFAULT_ACTIVE_ROOT: &str = "/active";
/// Root of the idle tier when no rclone remote is configured.
pub const DEFAULT_IDLE_ROOT: &str = "/idle";
/// rclone configuration that must exist when a remote idle tier is configured.
pub const DEFAULT_RCLONE_CONFIG_PATH: &str = "/home/user/.config/rclone/rclone.conf";
/// rclone executable name or path.
pub const DEFAULT_RCLONE_BINARY: &str = "rclone";
/// Download client request timeout in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Append-only run log.
pub const DEFAULT_LOG_FILE: &str = "/config/autoarr.log";
/// Default log filter directive.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// `PoolSize` is expressed in decimal gigabytes.
pub(crate) const BYTES_PER_GIGABYTE: f64 = 1_000_000_000.0;
