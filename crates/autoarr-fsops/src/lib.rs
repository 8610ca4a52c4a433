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

//! Payload movers for the active and idle storage tiers.
//!
//! Layout: `rclone.rs` (`RcloneMover`, shells out to rclone), `local.rs` (`LocalMover`,
//! in-process copy/rename/delete), `error.rs` (structured errors).

pub mod error;
pub mod local;
pub mod rclone;

pub use error::{FsOpsError, FsOpsResult};
pub use local::{LocalMover, is_remote_path};
pub use rclone::RcloneMover;
