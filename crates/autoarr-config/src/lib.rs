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

//! JSON settings document for autoarr.
//!
//! Layout: `model.rs` (typed settings and policy conversion), `validate.rs` (field validation),
//! `loader.rs` (file loading and environment checks), `defaults.rs` (fallback values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{check_environment, load, parse};
pub use model::{ConditionSettings, LogFormatSetting, MoverKind, Settings};
pub use validate::{parse_client_url, validate};
