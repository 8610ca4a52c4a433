//! Wires settings, logging and collaborators together for one invocation.

use std::sync::Arc;

use autoarr_config::{MoverKind, Settings};
use autoarr_core::{DownloadControl, FileMigrator, Plan, PoolPolicy, SnapshotSource};
use autoarr_fsops::{LocalMover, RcloneMover};
use autoarr_qbit::QbitClient;
use autoarr_telemetry::{LoggingConfig, RunContext, build_sha, init_logging};
use tracing::{Instrument, error, info};

use crate::cli::{Cli, Command};
use crate::error::{AppError, AppResult};
use crate::executor::PlanExecutor;
use crate::report::RunReport;

/// Collaborators used by a decision pass.
#[derive(Clone)]
pub struct Services {
    /// Download client listing.
    pub source: Arc<dyn SnapshotSource>,
    /// Download client commands.
    pub control: Arc<dyn DownloadControl>,
    /// Payload mover.
    pub migrator: Arc<dyn FileMigrator>,
    /// Whether the collaborators were built in dry-run mode.
    pub dry_run: bool,
}

impl Services {
    /// Build production collaborators. `force_dry_run` overrides both no-change settings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Setup`] when the download client cannot be constructed.
    pub fn from_settings(settings: &Settings, force_dry_run: bool) -> AppResult<Self> {
        let client_dry_run = force_dry_run || settings.do_not_change_download_client;
        let files_dry_run = force_dry_run || settings.do_not_change_files;

        let client = Arc::new(
            QbitClient::new(
                &settings.download_client_url,
                settings.http_timeout(),
                client_dry_run,
            )
            .map_err(|err| AppError::setup("qbit.client", err))?,
        );
        let migrator: Arc<dyn FileMigrator> = match settings.mover {
            MoverKind::Rclone => Arc::new(RcloneMover::new(
                settings.rclone_binary.clone(),
                settings
                    .remote()
                    .map(|_| settings.rclone_config_path.clone()),
                files_dry_run,
            )),
            MoverKind::Local => Arc::new(LocalMover::new(files_dry_run)),
        };

        info!(
            api = %client.api_root(),
            mover = settings.mover.as_str(),
            client_dry_run,
            files_dry_run,
            "collaborators ready"
        );
        Ok(Self {
            source: client.clone(),
            control: client,
            migrator,
            dry_run: client_dry_run && files_dry_run,
        })
    }
}

/// Fetch a snapshot and compute the transition plan.
///
/// # Errors
///
/// Returns [`AppError::Snapshot`] when the listing cannot be fetched and [`AppError::Engine`]
/// when the decision pass rejects it.
pub async fn plan_cycle(source: &dyn SnapshotSource, policy: &PoolPolicy) -> AppResult<Plan> {
    let snapshot = source
        .snapshot()
        .await
        .map_err(|source| AppError::Snapshot { source })?;
    let plan = autoarr_core::evaluate(&snapshot, policy).map_err(|source| AppError::Engine {
        operation: "engine.evaluate",
        source,
    })?;
    info!(
        total = plan.summary.total,
        ignored = plan.summary.ignored,
        active = plan.summary.active,
        idle = plan.summary.idle,
        removed = plan.summary.removed,
        deferred_removals = plan.summary.deferred_removals,
        actions = plan.action_count(),
        "plan computed"
    );
    Ok(plan)
}

/// Fetch, decide and apply one pass.
///
/// # Errors
///
/// Returns the errors of [`plan_cycle`]. Action failures do not abort the pass; they are
/// reported in the returned [`RunReport`].
pub async fn run_cycle(
    services: &Services,
    policy: &PoolPolicy,
    context: &RunContext,
) -> AppResult<RunReport> {
    let plan = plan_cycle(services.source.as_ref(), policy).await?;
    let executor = PlanExecutor::new(services.control.clone(), services.migrator.clone());
    let report = executor
        .apply(&plan, context.run_id, services.dry_run || context.dry_run)
        .await;
    report.log_summary();
    Ok(report)
}

/// Entry point for the `autoarr` binary.
///
/// # Errors
///
/// Returns [`AppError::Config`] for unusable settings, [`AppError::RunFailed`] when some
/// downloads could not be transitioned, and the errors of [`run_cycle`].
pub async fn run(cli: Cli) -> AppResult<()> {
    let settings = autoarr_config::load(&cli.config)
        .await
        .map_err(|err| AppError::config("settings.load", err))?;
    let policy = settings
        .to_policy()
        .map_err(|err| AppError::config("settings.policy", err))?;

    let log_file = settings.log_file_path();
    let logging = LoggingConfig {
        level: cli.log_level.as_deref().unwrap_or(&settings.log_level),
        format: cli.resolve_log_format(settings.log_format),
        build_sha: build_sha(),
        log_file: log_file.as_deref(),
    };
    init_logging(&logging).map_err(|source| AppError::Telemetry {
        operation: "telemetry.init",
        source,
    })?;

    let command = cli.selected_command();
    let context = RunContext::new(cli.dry_run);
    let span = context.span(command.label());
    let result = async {
        info!(config = %cli.config.display(), "autoarr starting");
        let services = Services::from_settings(&settings, cli.dry_run)?;
        execute(command, &services, &policy, &context).await
    }
    .instrument(span)
    .await;

    if let Err(err) = &result {
        error!(
            run_id = %context.run_id,
            exit_code = err.exit_code(),
            error = %err.display_message(),
            "autoarr failed"
        );
    }
    result
}

async fn execute(
    command: Command,
    services: &Services,
    policy: &PoolPolicy,
    context: &RunContext,
) -> AppResult<()> {
    match command {
        Command::Plan => {
            let plan = plan_cycle(services.source.as_ref(), policy).await?;
            let rendered =
                serde_json::to_string_pretty(&plan).map_err(|source| AppError::Render { source })?;
            println!("{rendered}");
            Ok(())
        }
        Command::Run => {
            let report = run_cycle(services, policy, context).await?;
            match report.failed() {
                0 => Ok(()),
                failed => Err(AppError::RunFailed { failed }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            download_client_url: "http://qbit:8080".to_string(),
            pool_size: 1.0,
            sort_field: "ratio".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn no_change_settings_combine_into_dry_run() -> anyhow::Result<()> {
        assert!(Services::from_settings(&settings(), true)?.dry_run);

        let mut configured = settings();
        assert!(!Services::from_settings(&configured, false)?.dry_run);

        configured.do_not_change_download_client = true;
        assert!(!Services::from_settings(&configured, false)?.dry_run);

        configured.do_not_change_files = true;
        assert!(Services::from_settings(&configured, false)?.dry_run);
        Ok(())
    }

    #[test]
    fn local_mover_is_selectable() -> anyhow::Result<()> {
        let mut settings = settings();
        settings.mover = MoverKind::Local;
        Services::from_settings(&settings, false)?;
        Ok(())
    }

    #[test]
    fn bad_client_url_is_a_setup_error() {
        let mut settings = settings();
        settings.download_client_url = "qbit".to_string();
        assert!(matches!(
            Services::from_settings(&settings, false),
            Err(AppError::Setup { .. })
        ));
    }
}
