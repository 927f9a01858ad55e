//! # Locate Command Implementation
//!
//! Registers an editor installed outside the install location, such as one on
//! an external drive. The directory must contain `Unity.app`; locations that
//! disappear are dropped on the next refresh.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use editor_hub::installation;
use editor_hub::output::emoji;
use editor_hub::reconcile;

use super::{absolute, Context};

/// Add or remove an installation outside the install location
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Installation directory containing Unity.app
    #[arg(value_name = "DIR")]
    pub path: PathBuf,

    /// Forget the location instead of adding it.
    #[arg(long)]
    pub remove: bool,
}

/// Execute the `locate` command.
pub async fn execute(context: &Context, args: LocateArgs) -> Result<()> {
    let path = absolute(&args.path);

    if args.remove {
        context.hub.remove_custom_install_location(&path).await?;
        println!("Forgot {}", path.display());
        return Ok(());
    }

    if !installation::bundle_path(&path).exists() {
        bail!(
            "{} does not contain {}",
            path.display(),
            installation::EDITOR_BUNDLE
        );
    }

    let versions = context.hub.add_custom_install_location(&path).await?;
    let state = context.hub.snapshot().await?;
    if !state.settings.custom_install_locations.contains(&path) {
        bail!("{} is not a valid editor installation", path.display());
    }

    match versions.iter().find(|install| install.path == path) {
        Some(found) => println!(
            "{} Found {} at {}",
            emoji(&context.output, "✅", "[ok]"),
            found.version,
            path.display()
        ),
        None if reconcile::validate_editor(&path) => println!("Added {}", path.display()),
        None => {
            context.hub.remove_custom_install_location(&path).await?;
            bail!("{} is not a valid editor installation", path.display());
        }
    }
    Ok(())
}
