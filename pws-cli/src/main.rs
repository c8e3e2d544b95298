//! Binary crate for the `pws` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Stored stations and unit preferences
//! - Fetching station payloads over HTTP
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod config;
mod fetch;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cmd.log_level)
        .with_writer(std::io::stderr)
        .init();

    cmd.run().await
}
