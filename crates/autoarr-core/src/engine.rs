//! Full decision pass: classify, prioritize, partition, plan.

use tracing::debug;

use crate::classify::{evaluate_removal, is_ignored};
use crate::error::CoreResult;
use crate::model::{Decision, Download, PoolPolicy, Snapshot};
use crate::partition::{PoolBudget, partition};
use crate::plan::{Plan, plan};
use crate::priority::prioritize;

/// Classification and partitioning outcome for a whole snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolDecisions<'a> {
    /// Unconditional removals (snapshot order), then partitioned downloads (priority order),
    /// then ignored downloads (snapshot order).
    pub decisions: Vec<Decision<'a>>,
    /// Budget accounting after partitioning.
    pub budget: PoolBudget,
}

/// Classify and partition every download in the snapshot.
///
/// Removal candidates are partitioned like eligible downloads only when removal is gated on a
/// full pool; otherwise they are removed outright and consume no budget.
///
/// # Errors
///
/// Fails on an invalid policy or on the first download missing a referenced field. No partial
/// result is produced.
pub fn decide<'a>(snapshot: &'a Snapshot, policy: &PoolPolicy) -> CoreResult<PoolDecisions<'a>> {
    policy.validate()?;

    let mut ignored: Vec<&'a Download> = Vec::new();
    let mut removals: Vec<&'a Download> = Vec::new();
    let mut ranked: Vec<&'a Download> = Vec::new();
    let mut flagged: Vec<&'a str> = Vec::new();

    for download in &snapshot.downloads {
        if is_ignored(download, &policy.ignore) {
            ignored.push(download);
            continue;
        }
        if evaluate_removal(download, &policy.removal)? {
            flagged.push(download.id.as_str());
            if !policy.remove_only_when_full {
                removals.push(download);
                continue;
            }
        }
        ranked.push(download);
    }

    let ordered = prioritize(ranked, &policy.sort)?;
    let reserved: &[&Download] = if policy.count_ignored_in_budget {
        &ignored
    } else {
        &[]
    };
    let partitioned = partition(&ordered, reserved, policy.budget_bytes);

    debug!(
        ignored = ignored.len(),
        removals = removals.len(),
        partitioned = partitioned.placements.len(),
        used_bytes = partitioned.budget.used,
        budget_bytes = partitioned.budget.limit,
        "partitioned download pool"
    );

    let mut decisions = Vec::with_capacity(snapshot.downloads.len());
    decisions.extend(removals.into_iter().map(|download| Decision {
        download,
        ignored: false,
        marked_for_removal: true,
        bucket: None,
    }));
    decisions.extend(
        partitioned
            .placements
            .iter()
            .map(|&(download, bucket)| Decision {
                download,
                ignored: false,
                marked_for_removal: flagged.contains(&download.id.as_str()),
                bucket: Some(bucket),
            }),
    );
    decisions.extend(ignored.into_iter().map(|download| Decision {
        download,
        ignored: true,
        marked_for_removal: false,
        bucket: None,
    }));

    Ok(PoolDecisions {
        decisions,
        budget: partitioned.budget,
    })
}

/// Run a complete decision pass and return the transition plan.
///
/// # Errors
///
/// See [`decide`].
pub fn evaluate(snapshot: &Snapshot, policy: &PoolPolicy) -> CoreResult<Plan> {
    let decisions = decide(snapshot, policy)?;
    Ok(plan(&decisions, &snapshot.default_save_path, policy))
}
