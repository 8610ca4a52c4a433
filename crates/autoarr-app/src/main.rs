#![forbid(unsafe_code)]
#![deny(unused_must_use, clippy::all, clippy::pedantic, clippy::nursery)]

//! Binary entrypoint: one fetch, decide and apply pass per invocation.

use std::process;

use autoarr_app::{Cli, run};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err.display_message());
        process::exit(err.exit_code());
    }
}
