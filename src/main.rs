//! # Editor Hub CLI
//!
//! This is the binary entry point for the `editor-hub` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and the Tokio runtime.
//! - Executing the appropriate command and translating errors into
//!   user-friendly output.
//!
//! The hub logic lives in the `editor_hub` library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute().await
}
