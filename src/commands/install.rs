//! # Install Command Implementation
//!
//! Installs an editor version through the hub's headless installer, or adds
//! modules to a version that is already installed. The command waits for the
//! installer to finish and fails if it did not report success.

use anyhow::Result;
use clap::Args;

use editor_hub::module;

use super::{parse_version, report, wait_with_spinner, Context};

/// Install an editor version or add modules to it
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Version to install (e.g., 2021.3.5f1)
    #[arg(value_name = "VERSION")]
    pub version: String,

    /// Module to install alongside the editor; repeat for several.
    #[arg(short, long = "module", value_name = "ID")]
    pub modules: Vec<String>,
}

/// Execute the `install` command.
pub async fn execute(context: &Context, args: InstallArgs) -> Result<()> {
    let version = parse_version(&args.version)?;
    for id in &args.modules {
        if module::lookup(id).is_none() {
            log::warn!("Module {} is not in the known catalog; passing it through", id);
        }
    }

    let handle = context.hub.install(version, args.modules).await?;
    let status = wait_with_spinner(&handle, format!("Installing {}...", version)).await?;
    report(&context.output, &status, &format!("Installed {}", version))?;

    if let Some(installed) = context.hub.snapshot().await?.installation(&version) {
        println!("  {}", context.output.dim(&installed.path.display().to_string()));
    }
    Ok(())
}
