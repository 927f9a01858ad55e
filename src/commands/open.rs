//! # Open Command Implementation
//!
//! Launches the editor matching a project's version. The editor runs detached
//! and keeps running after this command returns.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use editor_hub::output::emoji;

use super::{absolute, Context};

/// Open a project in its editor
#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Project directory
    #[arg(value_name = "DIR")]
    pub path: PathBuf,
}

/// Execute the `open` command.
pub async fn execute(context: &Context, args: OpenArgs) -> Result<()> {
    let command = context.hub.open_project(absolute(&args.path)).await?;
    println!(
        "{} {}",
        emoji(&context.output, "🚀", "Launched"),
        context.output.dim(&command.to_string())
    );
    Ok(())
}
