//! Run report: what happened to every planned download.

use autoarr_core::{DownloadPlan, PlanSummary, Transition};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Failure that stopped a download's remaining actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    /// Kind of the action that failed (see [`autoarr_core::Action::kind`]).
    pub action: &'static str,
    /// Rendered error chain.
    pub message: String,
}

/// Outcome of applying one plan entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    /// Download identifier.
    pub id: String,
    /// Download name.
    pub name: String,
    /// Planned transition.
    pub transition: Transition,
    /// Actions in the plan entry.
    pub actions_planned: usize,
    /// Actions that completed before the first failure.
    pub actions_applied: usize,
    /// First failure, if any.
    pub failure: Option<ActionFailure>,
}

impl DownloadOutcome {
    /// Fresh outcome for an entry with nothing applied yet.
    #[must_use]
    pub fn pending(entry: &DownloadPlan) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone(),
            transition: entry.transition,
            actions_planned: entry.actions.len(),
            actions_applied: 0,
            failure: None,
        }
    }

    /// Whether every planned action was applied.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failure.is_none() && self.actions_applied == self.actions_planned
    }
}

/// Report for one `run` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Run identifier shared with the log span.
    pub run_id: Uuid,
    /// Whether collaborators ran in dry-run mode.
    pub dry_run: bool,
    /// When execution started.
    pub started_at: DateTime<Utc>,
    /// When execution finished; `None` while running.
    pub finished_at: Option<DateTime<Utc>>,
    /// Decision pass counters.
    pub summary: PlanSummary,
    /// Per-download outcomes in execution order; unchanged entries are omitted.
    pub outcomes: Vec<DownloadOutcome>,
}

impl RunReport {
    /// Start a report for a plan with the given counters.
    #[must_use]
    pub fn start(run_id: Uuid, dry_run: bool, summary: PlanSummary) -> Self {
        Self {
            run_id,
            dry_run,
            started_at: Utc::now(),
            finished_at: None,
            summary,
            outcomes: Vec::new(),
        }
    }

    /// Append an outcome.
    pub fn record(&mut self, outcome: DownloadOutcome) {
        self.outcomes.push(outcome);
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Number of downloads whose actions did not all succeed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.failure.is_some())
            .count()
    }

    /// Total actions applied across all downloads.
    #[must_use]
    pub fn actions_applied(&self) -> usize {
        self.outcomes
            .iter()
            .map(|outcome| outcome.actions_applied)
            .sum()
    }

    /// Number of downloads with the given transition.
    #[must_use]
    pub fn count(&self, transition: Transition) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.transition == transition)
            .count()
    }

    /// Wall-clock duration in milliseconds, once finished.
    #[must_use]
    pub fn elapsed_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }

    /// Emit the summary line.
    pub fn log_summary(&self) {
        let failed = self.failed();
        let elapsed_ms = self.elapsed_ms().unwrap_or_default();
        if failed == 0 {
            info!(
                activated = self.count(Transition::Activate),
                deactivated = self.count(Transition::Deactivate),
                removed = self.count(Transition::Remove),
                actions = self.actions_applied(),
                active = self.summary.active,
                idle = self.summary.idle,
                ignored = self.summary.ignored,
                used_bytes = self.summary.used_bytes,
                budget_bytes = self.summary.budget_bytes,
                elapsed_ms,
                "run complete"
            );
        } else {
            warn!(
                failed,
                activated = self.count(Transition::Activate),
                deactivated = self.count(Transition::Deactivate),
                removed = self.count(Transition::Remove),
                actions = self.actions_applied(),
                elapsed_ms,
                "run complete with failures"
            );
        }
    }
}
