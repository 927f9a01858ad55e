//! # Uninstall Command Implementation
//!
//! Removes an editor version from the hub and deletes its directory. Asks for
//! confirmation unless `--yes` is given.

use anyhow::Result;
use clap::Args;

use super::{confirm, parse_version, report, wait_with_spinner, Context};

/// Uninstall an editor version
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Version to uninstall
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the `uninstall` command.
pub async fn execute(context: &Context, args: UninstallArgs) -> Result<()> {
    let version = parse_version(&args.version)?;
    let state = context.hub.snapshot().await?;
    let Some(installed) = state.installation(&version) else {
        anyhow::bail!("Version {} is not installed", version);
    };

    let prompt = format!(
        "Delete {} at {}?",
        version,
        installed.path.display()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let handle = context.hub.uninstall(version).await?;
    let status = wait_with_spinner(&handle, format!("Removing {}...", version)).await?;
    report(&context.output, &status, &format!("Uninstalled {}", version))
}
