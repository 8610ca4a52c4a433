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

//! qBittorrent Web API adapter.
//!
//! Layout: `client.rs` (`QbitClient`, snapshot source and download control), `model.rs`
//! (`torrents/info` parsing and state mapping), `error.rs` (adapter errors).

pub mod client;
pub mod error;
pub mod model;

pub use client::QbitClient;
pub use error::{QbitError, QbitResult};
pub use model::{SeedState, parse_torrent_list};
