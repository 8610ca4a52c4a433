//! Core domain types shared across the workspace.
//!
//! # Design
//! - Downloads are immutable snapshot records; nothing here talks to the client.
//! - Numeric attributes live in a typed `FieldMap` with an explicit missing-field failure.
//! - `PoolPolicy` is the single immutable configuration value threaded through each stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Numeric attributes reported by the client for a download, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, f64>);

impl FieldMap {
    /// Create an empty field map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.0.insert(field.into(), value);
    }

    /// Look up a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }

    /// Number of fields recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field names and values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One torrent known to the download client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    /// Opaque info-hash identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Client category.
    pub category: String,
    /// Raw tag string as reported by the client.
    pub tags: String,
    /// Absolute path of the payload as reported by the client.
    pub content_path: String,
    /// Total payload size in bytes.
    pub size: u64,
    /// Whether the client currently runs the download (`false` means paused).
    pub active: bool,
    /// Numeric attributes usable as sort keys and removal-condition keys.
    #[serde(default)]
    pub fields: FieldMap,
}

impl Download {
    /// Resolve a numeric field, failing when the client did not report it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] when the field is absent.
    pub fn field(&self, name: &str) -> CoreResult<f64> {
        self.fields
            .get(name)
            .ok_or_else(|| CoreError::missing_field(&self.id, name))
    }
}

/// Everything the decision engine needs from the client for one pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Client-wide default save directory used to derive relative payload paths.
    pub default_save_path: String,
    /// Downloads in the order the client listed them.
    pub downloads: Vec<Download>,
}

/// Block/allow substring pair for one classification axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Substring that, when present, ignores the download.
    pub block: Option<String>,
    /// Substring that must be present; its absence ignores the download.
    pub allow: Option<String>,
}

impl PatternRule {
    /// Build a rule, treating empty strings as "not configured".
    #[must_use]
    pub fn new(block: impl Into<String>, allow: impl Into<String>) -> Self {
        let non_empty = |value: String| (!value.is_empty()).then_some(value);
        Self {
            block: non_empty(block.into()),
            allow: non_empty(allow.into()),
        }
    }

    /// Whether the configured block pattern occurs in `value`.
    #[must_use]
    pub fn blocks(&self, value: &str) -> bool {
        self.block
            .as_deref()
            .is_some_and(|pattern| value.contains(pattern))
    }

    /// Whether the configured allow pattern is missing from `value`.
    #[must_use]
    pub fn disallows(&self, value: &str) -> bool {
        self.allow
            .as_deref()
            .is_some_and(|pattern| !value.contains(pattern))
    }
}

/// Ignore rules for the name, tag and category axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRules {
    /// Rule applied to the download name.
    pub name: PatternRule,
    /// Rule applied to the raw tag string.
    pub tag: PatternRule,
    /// Rule applied to the category.
    pub category: PatternRule,
}

/// One numeric threshold test over a download field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveCondition {
    /// Field name looked up in the download's field map.
    pub field: String,
    /// Test `value < threshold` instead of `value > threshold`.
    pub invert: bool,
    /// Threshold compared against; zero means "not configured" and is rejected.
    pub threshold: f64,
}

impl RemoveCondition {
    /// Evaluate the condition against a field value.
    #[must_use]
    pub fn is_satisfied_by(&self, value: f64) -> bool {
        if self.invert {
            value < self.threshold
        } else {
            value > self.threshold
        }
    }
}

/// How per-condition outcomes combine into a removal verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Short-circuit OR: the first satisfied condition marks the download.
    Inclusive,
    /// Short-circuit AND: the first unsatisfied condition clears the download.
    #[default]
    Exclusive,
}

impl RemovalMode {
    /// Outcome that stops evaluation in this mode.
    #[must_use]
    pub const fn short_circuit_on(self) -> bool {
        matches!(self, Self::Inclusive)
    }

    /// Fold lazily evaluated per-condition outcomes.
    ///
    /// Evaluation stops at the first outcome equal to [`Self::short_circuit_on`]; later
    /// outcomes are never pulled from the iterator. Without a short-circuit the verdict is the
    /// last outcome, and an empty sequence yields `false`.
    ///
    /// # Errors
    ///
    /// Propagates the first error produced before the short-circuit point.
    pub fn fold<E, I>(self, outcomes: I) -> Result<bool, E>
    where
        I: IntoIterator<Item = Result<bool, E>>,
    {
        let stop_on = self.short_circuit_on();
        let mut evaluated = false;
        for outcome in outcomes {
            evaluated = true;
            if outcome? == stop_on {
                return Ok(stop_on);
            }
        }
        Ok(evaluated && !stop_on)
    }
}

/// Ordered removal conditions plus their combination mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemovalRules {
    /// Conditions in evaluation order.
    pub conditions: Vec<RemoveCondition>,
    /// Combination mode.
    pub mode: RemovalMode,
}

/// Sort key configuration for the priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Numeric field used as the sort key.
    pub field: String,
    /// Sort descending instead of ascending.
    pub descending: bool,
}

/// Placement of the two storage tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLayout {
    /// Root of the local active tier.
    pub active_root: String,
    /// Root of the local idle tier, used when no remote is configured.
    pub idle_root: String,
    /// rclone remote name hosting the idle tier.
    pub remote: Option<String>,
}

impl Default for TierLayout {
    fn default() -> Self {
        Self {
            active_root: "/active".to_string(),
            idle_root: "/idle".to_string(),
            remote: None,
        }
    }
}

/// Immutable configuration consumed by every stage of a decision pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolPolicy {
    /// Active pool capacity in bytes.
    pub budget_bytes: u64,
    /// Priority order.
    pub sort: SortOrder,
    /// Ignore rules.
    pub ignore: IgnoreRules,
    /// Removal rules.
    pub removal: RemovalRules,
    /// Charge ignored downloads against the budget.
    pub count_ignored_in_budget: bool,
    /// Only remove candidates that did not fit the active pool.
    pub remove_only_when_full: bool,
    /// Migrate payloads between tiers on activation and deactivation.
    pub use_stash: bool,
    /// Never destroy files: stash by copy, and skip destructive removal.
    pub preserve_files: bool,
    /// Ask the client to recheck payloads before resuming.
    pub recheck_on_resume: bool,
    /// Tier placement.
    pub tiers: TierLayout,
}

impl PoolPolicy {
    /// Construct a policy with every optional behaviour disabled.
    #[must_use]
    pub fn new(budget_bytes: u64, sort: SortOrder) -> Self {
        Self {
            budget_bytes,
            sort,
            ignore: IgnoreRules::default(),
            removal: RemovalRules::default(),
            count_ignored_in_budget: false,
            remove_only_when_full: false,
            use_stash: false,
            preserve_files: false,
            recheck_on_resume: false,
            tiers: TierLayout::default(),
        }
    }

    /// Reject policies that would make a decision pass meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPolicy`] for a zero budget, an empty sort field, or a removal
    /// condition with an empty field or a zero threshold.
    pub fn validate(&self) -> CoreResult<()> {
        if self.budget_bytes == 0 {
            return Err(CoreError::InvalidPolicy {
                field: "budget_bytes",
                reason: "must be greater than zero",
                value: Some("0".to_string()),
            });
        }
        if self.sort.field.trim().is_empty() {
            return Err(CoreError::InvalidPolicy {
                field: "sort.field",
                reason: "must not be empty",
                value: None,
            });
        }
        for condition in &self.removal.conditions {
            if condition.field.trim().is_empty() {
                return Err(CoreError::InvalidPolicy {
                    field: "removal.conditions.field",
                    reason: "must not be empty",
                    value: None,
                });
            }
            if condition.threshold == 0.0 || !condition.threshold.is_finite() {
                return Err(CoreError::InvalidPolicy {
                    field: "removal.conditions.threshold",
                    reason: "must be a finite non-zero number",
                    value: Some(condition.field.clone()),
                });
            }
        }
        Ok(())
    }
}

/// Target tier chosen by the partitioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Keep (or make) the download active on the hot tier.
    Active,
    /// Pause the download and park it on the idle tier.
    Idle,
}

/// Classification and partitioning outcome for one download.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision<'a> {
    /// Download the decision applies to.
    pub download: &'a Download,
    /// Excluded from accounting and transitions.
    pub ignored: bool,
    /// Matched the removal rules.
    pub marked_for_removal: bool,
    /// Bucket assigned by the partitioner, when the download took part in partitioning.
    pub bucket: Option<Bucket>,
}
