//! Applies a transition plan through the collaborator traits.
//!
//! # Design
//! - Entries run sequentially in plan order; actions of one entry run in emitted order.
//! - The first failing action stops the rest of its entry, since later actions depend on it.
//!   Other entries still run and the failure lands in the report.
//! - No retries and no rollback.

use std::sync::Arc;

use autoarr_core::{Action, DownloadControl, DownloadPlan, FileMigrator, Plan, Transition};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::report::{ActionFailure, DownloadOutcome, RunReport};

/// Executes plans against a download client and a file migrator.
#[derive(Clone)]
pub struct PlanExecutor {
    control: Arc<dyn DownloadControl>,
    migrator: Arc<dyn FileMigrator>,
}

impl PlanExecutor {
    /// Bind the executor to its collaborators.
    #[must_use]
    pub const fn new(control: Arc<dyn DownloadControl>, migrator: Arc<dyn FileMigrator>) -> Self {
        Self { control, migrator }
    }

    /// Apply every entry of `plan` and report the outcomes.
    pub async fn apply(&self, plan: &Plan, run_id: Uuid, dry_run: bool) -> RunReport {
        let mut report = RunReport::start(run_id, dry_run, plan.summary);
        for entry in &plan.entries {
            if entry.transition == Transition::Unchanged {
                continue;
            }
            report.record(self.apply_entry(entry).await);
        }
        report.finish();
        report
    }

    async fn apply_entry(&self, entry: &DownloadPlan) -> DownloadOutcome {
        let mut outcome = DownloadOutcome::pending(entry);
        if entry.transition == Transition::RemovePreserved {
            info!(
                id = %entry.id,
                name = %entry.name,
                "removal skipped because files are preserved"
            );
            return outcome;
        }

        info!(
            id = %entry.id,
            name = %entry.name,
            transition = entry.transition.as_str(),
            actions = entry.actions.len(),
            "applying transition"
        );
        for action in &entry.actions {
            if let Err(err) = self.apply_action(action).await {
                let message = format!("{err:#}");
                warn!(
                    id = %entry.id,
                    name = %entry.name,
                    action = action.kind(),
                    error = %message,
                    skipped = entry.actions.len() - outcome.actions_applied - 1,
                    "action failed; skipping the rest of this download"
                );
                outcome.failure = Some(ActionFailure {
                    action: action.kind(),
                    message,
                });
                break;
            }
            outcome.actions_applied += 1;
        }
        outcome
    }

    async fn apply_action(&self, action: &Action) -> anyhow::Result<()> {
        debug!(action = action.kind(), "executing action");
        match action {
            Action::Pause { id } => self.control.pause(id).await,
            Action::Resume { id } => self.control.resume(id).await,
            Action::Recheck { id } => self.control.recheck(id).await,
            Action::Reannounce { id } => self.control.reannounce(id).await,
            Action::DeleteAndPurge {
                id,
                idle_path,
                active_path,
            } => {
                self.migrator.purge(idle_path).await?;
                self.migrator.purge(active_path).await?;
                self.control.delete(id, true).await
            }
            Action::MigrateFiles { from, to, mode } => {
                self.migrator.transfer(from, to, *mode).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoarr_core::{PlanSummary, Target, TransferMode};
    use autoarr_test_support::mocks::{Journal, RecordingControl, RecordingMigrator};

    fn executor(journal: &Journal) -> PlanExecutor {
        PlanExecutor::new(
            Arc::new(RecordingControl::new(journal.clone())),
            Arc::new(RecordingMigrator::new(journal.clone())),
        )
    }

    fn entry(id: &str, target: Target, transition: Transition, actions: Vec<Action>) -> DownloadPlan {
        DownloadPlan {
            id: id.to_string(),
            name: id.to_string(),
            target,
            transition,
            removal_deferred: false,
            actions,
        }
    }

    fn sample_plan() -> Plan {
        Plan {
            entries: vec![
                entry(
                    "gone",
                    Target::Removed,
                    Transition::Remove,
                    vec![Action::DeleteAndPurge {
                        id: "gone".to_string(),
                        idle_path: "/idle/gone".to_string(),
                        active_path: "/active/gone".to_string(),
                    }],
                ),
                entry(
                    "cold",
                    Target::Idle,
                    Transition::Deactivate,
                    vec![
                        Action::Pause {
                            id: "cold".to_string(),
                        },
                        Action::MigrateFiles {
                            from: "/active/cold".to_string(),
                            to: "/idle/cold".to_string(),
                            mode: TransferMode::Move,
                        },
                    ],
                ),
                entry("steady", Target::Active, Transition::Unchanged, Vec::new()),
                entry(
                    "hot",
                    Target::Active,
                    Transition::Activate,
                    vec![
                        Action::Resume {
                            id: "hot".to_string(),
                        },
                        Action::Reannounce {
                            id: "hot".to_string(),
                        },
                    ],
                ),
            ],
            summary: PlanSummary::default(),
        }
    }

    #[tokio::test]
    async fn actions_run_in_plan_order() {
        let journal = Journal::new();
        let report = executor(&journal)
            .apply(&sample_plan(), Uuid::nil(), false)
            .await;

        assert_eq!(
            journal.calls(),
            [
                "purge /idle/gone",
                "purge /active/gone",
                "delete gone files=true",
                "pause cold",
                "move /active/cold -> /idle/cold",
                "resume hot",
                "reannounce hot",
            ]
        );
        assert_eq!(report.failed(), 0);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.actions_applied(), 5);
        assert!(report.finished_at.is_some());
    }

    #[tokio::test]
    async fn failure_stops_only_its_own_download() {
        let journal = Journal::new();
        journal.fail_on("move /active/cold");
        let report = executor(&journal)
            .apply(&sample_plan(), Uuid::nil(), false)
            .await;

        assert_eq!(
            journal.calls(),
            [
                "purge /idle/gone",
                "purge /active/gone",
                "delete gone files=true",
                "pause cold",
                "resume hot",
                "reannounce hot",
            ]
        );
        assert_eq!(report.failed(), 1);
        let cold = &report.outcomes[1];
        assert_eq!(cold.id, "cold");
        assert_eq!(cold.actions_applied, 1);
        assert_eq!(
            cold.failure.as_ref().map(|failure| failure.action),
            Some("migrate_files")
        );
    }

    #[tokio::test]
    async fn failed_purge_keeps_the_download_at_the_client() {
        let journal = Journal::new();
        journal.fail_on("purge /active/gone");
        let report = executor(&journal)
            .apply(&sample_plan(), Uuid::nil(), false)
            .await;

        let calls = journal.calls();
        assert!(!calls.iter().any(|call| call.starts_with("delete gone")));
        assert_eq!(report.outcomes[0].actions_applied, 0);
        assert_eq!(report.failed(), 1);
    }

    #[tokio::test]
    async fn preserved_removal_is_reported_without_calls() {
        let journal = Journal::new();
        let plan = Plan {
            entries: vec![entry(
                "keep",
                Target::Removed,
                Transition::RemovePreserved,
                Vec::new(),
            )],
            summary: PlanSummary::default(),
        };

        let report = executor(&journal).apply(&plan, Uuid::nil(), true).await;
        assert!(journal.calls().is_empty());
        assert_eq!(report.count(Transition::RemovePreserved), 1);
        assert!(report.outcomes[0].is_complete());
        assert!(report.dry_run);
    }
}
