//! # Modules Command Implementation
//!
//! Lists the installed and available modules of an editor version, and removes
//! installed ones. Adding modules goes through `install`.

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use editor_hub::module::KnownModule;

use super::{confirm, parse_version, report, wait_with_spinner, Context};

/// List or remove modules of an installed editor
#[derive(Args, Debug)]
pub struct ModulesArgs {
    #[command(subcommand)]
    pub command: ModulesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ModulesCommand {
    /// Show installed and available modules
    List {
        /// Editor version
        #[arg(value_name = "VERSION")]
        version: String,
    },
    /// Remove an installed module
    Remove {
        /// Editor version
        #[arg(value_name = "VERSION")]
        version: String,

        /// Module id (e.g., android)
        #[arg(value_name = "ID")]
        module: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute the `modules` command.
pub async fn execute(context: &Context, args: ModulesArgs) -> Result<()> {
    match args.command {
        ModulesCommand::List { version } => list(context, &version).await,
        ModulesCommand::Remove {
            version,
            module,
            yes,
        } => remove(context, &version, &module, yes).await,
    }
}

async fn list(context: &Context, version: &str) -> Result<()> {
    let version = parse_version(version)?;
    let state = context.hub.snapshot().await?;
    let installed = state
        .installation(&version)
        .with_context(|| format!("Version {} is not installed", version))?;

    print_group(context, "Installed", &installed.installed_modules());
    print_group(context, "Available", &installed.available_modules());
    Ok(())
}

fn print_group(context: &Context, title: &str, modules: &[&KnownModule]) {
    println!("{}", context.output.bold(title));
    if modules.is_empty() {
        println!("  (none)");
    }
    for module in modules {
        println!("  {:<24} {}", module.id, context.output.dim(module.name));
    }
}

async fn remove(context: &Context, version: &str, module: &str, yes: bool) -> Result<()> {
    let version = parse_version(version)?;
    if !confirm(&format!("Remove {} from {}?", module, version), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let handle = context.hub.uninstall_module(version, module).await?;
    let status = wait_with_spinner(&handle, format!("Removing {}...", module)).await?;
    report(
        &context.output,
        &status,
        &format!("Removed {} from {}", module, version),
    )
}
