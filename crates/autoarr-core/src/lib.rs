#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! Pool decision engine for tiered torrent storage.
//!
//! Layout: `model` (downloads, field maps, pool policy), `classify` (ignore and removal tests),
//! `priority` (stable priority ordering), `partition` (greedy budget admission), `plan`
//! (transition planning), `engine` (the full decision pass), `service` (collaborator traits).

pub mod classify;
pub mod engine;
pub mod error;
pub mod model;
pub mod partition;
pub mod paths;
pub mod plan;
pub mod priority;
pub mod service;

pub use classify::{evaluate_removal, is_ignored};
pub use engine::{PoolDecisions, decide, evaluate};
pub use error::{CoreError, CoreResult};
pub use model::{
    Bucket, Decision, Download, FieldMap, IgnoreRules, PatternRule, PoolPolicy, RemovalMode,
    RemovalRules, RemoveCondition, Snapshot, SortOrder, TierLayout,
};
pub use partition::{Partition, PoolBudget, partition};
pub use paths::{TierPaths, relative_path};
pub use plan::{Action, DownloadPlan, Plan, PlanSummary, Target, TransferMode, Transition};
pub use priority::prioritize;
pub use service::{DownloadControl, FileMigrator, SnapshotSource};
