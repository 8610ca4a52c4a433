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

//! autoarr application wiring.
//!
//! Layout: `cli.rs` (arguments), `bootstrap.rs` (settings, logging and collaborator wiring),
//! `executor.rs` (plan application), `report.rs` (run report), `error.rs` (exit codes).

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod executor;
pub mod report;

pub use bootstrap::{Services, plan_cycle, run, run_cycle};
pub use cli::{Cli, Command, LogFormatArg};
pub use error::{AppError, AppResult, EXIT_CONFIG, EXIT_FAILURE};
pub use executor::PlanExecutor;
pub use report::{ActionFailure, DownloadOutcome, RunReport};
