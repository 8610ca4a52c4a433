//! Run-scoped tracing context.
//!
//! # Design
//! - Every invocation gets a fresh `run_id` so file logs from consecutive runs can be told apart.
//! - The span is returned rather than entered; callers instrument their future with it.

use tracing::Span;
use uuid::Uuid;

use crate::init::build_sha;

/// Identity of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Random identifier recorded on every event of the run.
    pub run_id: Uuid,
    /// Whether both no-change modes are forced.
    pub dry_run: bool,
}

impl RunContext {
    /// Start a new run context with a random identifier.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dry_run,
        }
    }

    /// Span carrying the run identifier and build SHA.
    #[must_use]
    pub fn span(&self, command: &str) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            command = %command,
            dry_run = self.dry_run,
            build_sha = %build_sha(),
        )
    }
}
