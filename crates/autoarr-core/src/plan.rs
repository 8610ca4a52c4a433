//! Transition planning: diff each decision against the observed client state.
//!
//! # Design
//! - Every non-ignored download gets exactly one entry; no-op entries carry no actions.
//! - Actions inside an entry must be applied in order; entries are independent of each other.
//! - Entries are ordered removals, then deactivations, then activations so space is freed
//!   before it is claimed.

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::PoolDecisions;
use crate::model::{Bucket, Decision, PoolPolicy};
use crate::paths::TierPaths;

/// How a payload is migrated between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// Remove the source after transfer.
    Move,
    /// Keep the source.
    Copy,
}

impl TransferMode {
    /// Lowercase label used in logs and the rendered plan.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
        }
    }
}

/// One step the executor performs against the client or the file migrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Pause the download at the client.
    Pause {
        /// Download identifier.
        id: String,
    },
    /// Resume the download at the client.
    Resume {
        /// Download identifier.
        id: String,
    },
    /// Ask the client to recheck the payload.
    Recheck {
        /// Download identifier.
        id: String,
    },
    /// Ask the client to reannounce to its trackers.
    Reannounce {
        /// Download identifier.
        id: String,
    },
    /// Purge both tier paths, then delete the download and its files at the client.
    DeleteAndPurge {
        /// Download identifier.
        id: String,
        /// Idle tier path to purge.
        idle_path: String,
        /// Active tier path to purge.
        active_path: String,
    },
    /// Migrate a payload between tiers.
    MigrateFiles {
        /// Source path.
        from: String,
        /// Destination path.
        to: String,
        /// Transfer mode.
        mode: TransferMode,
    },
}

impl Action {
    /// Short label used in logs and reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Pause { .. } => "pause",
            Self::Resume { .. } => "resume",
            Self::Recheck { .. } => "recheck",
            Self::Reannounce { .. } => "reannounce",
            Self::DeleteAndPurge { .. } => "delete_and_purge",
            Self::MigrateFiles { .. } => "migrate_files",
        }
    }
}

/// Final target of a non-ignored download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Remove the download.
    Removed,
    /// Park on the idle tier.
    Idle,
    /// Run on the active tier.
    Active,
}

impl Target {
    const fn planning_rank(self) -> u8 {
        match self {
            Self::Removed => 0,
            Self::Idle => 1,
            Self::Active => 2,
        }
    }
}

/// What a plan entry does to its download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Observed state already matches the target.
    Unchanged,
    /// Bring a paused download back to the active tier.
    Activate,
    /// Pause an active download and park it on the idle tier.
    Deactivate,
    /// Purge and delete the download.
    Remove,
    /// Removal intended, but files are preserved so nothing is touched.
    RemovePreserved,
}

impl Transition {
    /// Lowercase label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
            Self::Remove => "remove",
            Self::RemovePreserved => "remove_preserved",
        }
    }
}

/// Planned transition for a single download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadPlan {
    /// Download identifier.
    pub id: String,
    /// Download name, for logs.
    pub name: String,
    /// Resolved target.
    pub target: Target,
    /// Transition derived from target and observed state.
    pub transition: Transition,
    /// Removal candidate kept active because the pool still had room.
    pub removal_deferred: bool,
    /// Ordered actions; empty for no-op transitions.
    pub actions: Vec<Action>,
}

/// Counters describing one decision pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Downloads in the snapshot.
    pub total: usize,
    /// Downloads excluded by ignore rules.
    pub ignored: usize,
    /// Downloads targeted for removal (preserved or not).
    pub removed: usize,
    /// Downloads targeted for the idle tier.
    pub idle: usize,
    /// Downloads targeted for the active tier.
    pub active: usize,
    /// Removal candidates deferred because they fit the pool.
    pub deferred_removals: usize,
    /// Pool capacity in bytes.
    pub budget_bytes: u64,
    /// Bytes charged by the partitioner.
    pub used_bytes: u64,
}

/// Ordered transition plan for one decision pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Entries in execution order.
    pub entries: Vec<DownloadPlan>,
    /// Pass counters.
    pub summary: PlanSummary,
}

impl Plan {
    /// Total number of actions across all entries.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.actions.len()).sum()
    }

    /// Whether applying the plan would change nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.entries.iter().all(|entry| entry.actions.is_empty())
    }

    /// Entries that carry at least one action.
    pub fn changes(&self) -> impl Iterator<Item = &DownloadPlan> {
        self.entries.iter().filter(|entry| !entry.actions.is_empty())
    }
}

/// Build the transition plan for partitioned decisions.
#[must_use]
pub fn plan(decisions: &PoolDecisions<'_>, default_save_path: &str, policy: &PoolPolicy) -> Plan {
    let mut summary = PlanSummary {
        total: decisions.decisions.len(),
        budget_bytes: decisions.budget.limit,
        used_bytes: decisions.budget.used,
        ..PlanSummary::default()
    };

    let mut targeted: Vec<(&Decision<'_>, Target, bool)> = Vec::new();
    for decision in &decisions.decisions {
        let Some((target, deferred)) = resolve_target(decision, policy) else {
            summary.ignored += 1;
            continue;
        };
        match target {
            Target::Removed => summary.removed += 1,
            Target::Idle => summary.idle += 1,
            Target::Active => summary.active += 1,
        }
        if deferred {
            summary.deferred_removals += 1;
        }
        targeted.push((decision, target, deferred));
    }
    targeted.sort_by_key(|(_, target, _)| target.planning_rank());

    let entries = targeted
        .into_iter()
        .map(|(decision, target, deferred)| {
            plan_entry(decision, target, deferred, default_save_path, policy)
        })
        .collect();

    Plan { entries, summary }
}

fn resolve_target(decision: &Decision<'_>, policy: &PoolPolicy) -> Option<(Target, bool)> {
    if decision.ignored {
        return None;
    }
    match (decision.marked_for_removal, decision.bucket) {
        (true, Some(Bucket::Active)) if policy.remove_only_when_full => {
            Some((Target::Active, true))
        }
        (true, _) => Some((Target::Removed, false)),
        (false, Some(Bucket::Active)) => Some((Target::Active, false)),
        (false, Some(Bucket::Idle)) => Some((Target::Idle, false)),
        (false, None) => None,
    }
}

fn plan_entry(
    decision: &Decision<'_>,
    target: Target,
    deferred: bool,
    default_save_path: &str,
    policy: &PoolPolicy,
) -> DownloadPlan {
    let download = decision.download;
    let id = download.id.clone();
    let paths = TierPaths::for_download(download, default_save_path, &policy.tiers);

    let (transition, actions) = match target {
        Target::Removed if policy.preserve_files => {
            info!(
                download = %download.name,
                "not removing download because files are preserved"
            );
            (Transition::RemovePreserved, Vec::new())
        }
        Target::Removed => (
            Transition::Remove,
            vec![Action::DeleteAndPurge {
                id,
                idle_path: paths.idle,
                active_path: paths.active,
            }],
        ),
        Target::Idle if !download.active => (Transition::Unchanged, Vec::new()),
        Target::Idle => {
            let mut actions = vec![Action::Pause { id }];
            if policy.use_stash {
                let mode = if policy.preserve_files {
                    TransferMode::Copy
                } else {
                    TransferMode::Move
                };
                actions.push(Action::MigrateFiles {
                    from: paths.active,
                    to: paths.idle,
                    mode,
                });
            }
            (Transition::Deactivate, actions)
        }
        Target::Active if download.active => (Transition::Unchanged, Vec::new()),
        Target::Active => {
            let mut actions = Vec::new();
            if policy.use_stash {
                actions.push(Action::MigrateFiles {
                    from: paths.idle,
                    to: paths.active,
                    mode: TransferMode::Copy,
                });
            }
            if policy.recheck_on_resume {
                actions.push(Action::Recheck { id: id.clone() });
            }
            actions.push(Action::Resume { id: id.clone() });
            actions.push(Action::Reannounce { id });
            (Transition::Activate, actions)
        }
    };

    if deferred {
        debug!(download = %download.name, "removal deferred while the pool has room");
    }
    debug!(
        download = %download.name,
        transition = transition.as_str(),
        actions = actions.len(),
        "planned transition"
    );

    DownloadPlan {
        id: download.id.clone(),
        name: download.name.clone(),
        target,
        transition,
        removal_deferred: deferred,
        actions,
    }
}
