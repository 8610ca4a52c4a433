//! Command-line arguments.

use std::path::PathBuf;

use autoarr_config::LogFormatSetting;
use autoarr_config::defaults::DEFAULT_CONFIG_PATH;
use autoarr_telemetry::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Keep the most valuable torrents seeding within a fixed active pool.
#[derive(Debug, Parser)]
#[command(
    name = "autoarr",
    version,
    about = "Tiered active-pool manager for qBittorrent"
)]
pub struct Cli {
    /// Settings document.
    #[arg(
        long,
        global = true,
        env = "AUTOARR_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,
    /// Log level or `tracing` filter directive; overrides `LogLevel`.
    #[arg(long, global = true, env = "AUTOARR_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Console log format; overrides `LogFormat`.
    #[arg(long, global = true, env = "AUTOARR_LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormatArg>,
    /// Log every client request and file operation instead of performing it.
    #[arg(long, global = true, env = "AUTOARR_DRY_RUN")]
    pub dry_run: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Selected subcommand; `run` when none is given.
    #[must_use]
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or_default()
    }

    /// Console format: flag, then settings, then the build default.
    #[must_use]
    pub fn resolve_log_format(&self, configured: Option<LogFormatSetting>) -> LogFormat {
        match (self.log_format, configured) {
            (Some(LogFormatArg::Json), _) | (None, Some(LogFormatSetting::Json)) => LogFormat::Json,
            (Some(LogFormatArg::Pretty), _) | (None, Some(LogFormatSetting::Pretty)) => {
                LogFormat::Pretty
            }
            (None, None) => LogFormat::infer(),
        }
    }
}

/// Subcommands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch, decide and apply one pass.
    #[default]
    Run,
    /// Fetch and decide, then print the plan as JSON without applying it.
    Plan,
}

impl Command {
    /// Label used in the run span.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Plan => "plan",
        }
    }
}

/// `--log-format` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable output.
    Pretty,
    /// One JSON object per line.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_run_with_the_container_config() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["autoarr"])?;
        assert_eq!(cli.selected_command(), Command::Run);
        assert!(!cli.dry_run);
        if std::env::var_os("AUTOARR_CONFIG").is_none() {
            assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        }
        Ok(())
    }

    #[test]
    fn global_flags_follow_the_subcommand() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "autoarr",
            "plan",
            "--config",
            "/tmp/input.json",
            "--dry-run",
            "--log-format",
            "json",
        ])?;
        assert_eq!(cli.selected_command(), Command::Plan);
        assert!(cli.dry_run);
        assert_eq!(cli.config, PathBuf::from("/tmp/input.json"));
        assert_eq!(cli.log_format, Some(LogFormatArg::Json));
        Ok(())
    }

    #[test]
    fn log_format_flag_beats_settings() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["autoarr", "--log-format", "pretty"])?;
        assert_eq!(
            cli.resolve_log_format(Some(LogFormatSetting::Json)),
            LogFormat::Pretty
        );

        let cli = Cli::try_parse_from(["autoarr"])?;
        if std::env::var_os("AUTOARR_LOG_FORMAT").is_none() {
            assert_eq!(
                cli.resolve_log_format(Some(LogFormatSetting::Json)),
                LogFormat::Json
            );
            assert_eq!(cli.resolve_log_format(None), LogFormat::infer());
        }
        Ok(())
    }
}
