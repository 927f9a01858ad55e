//! # Settings Command Implementation
//!
//! Shows and edits the settings stored in the hub state file.
//!
//! ## Keys
//!
//! - `hub-location`, `install-location`, `project-location`: paths
//! - `timeout`: install timeout in seconds, or `none`
//! - `default-version`: editor version selected for new projects
//! - the presentation flags (`emoji`, `pins`, `show-location`,
//!   `show-filesize`, `small-sidebar`, `sidebar-count`): `true` or `false`

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};

use editor_hub::settings::FeatureFlags;

use super::{parse_version, Context};

/// Show or change hub settings
#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print all settings
    Show,
    /// Change one setting
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
}

/// Execute the `settings` command.
pub async fn execute(context: &Context, args: SettingsArgs) -> Result<()> {
    match args.command {
        SettingsCommand::Show => show(context).await,
        SettingsCommand::Set { key, value } => set(context, &key, &value).await,
    }
}

async fn show(context: &Context) -> Result<()> {
    let state = context.hub.snapshot().await?;
    let settings = &state.settings;

    println!("hub-location      {}", settings.hub_location.display());
    println!("install-location  {}", settings.install_location.display());
    println!("project-location  {}", settings.project_location.display());
    match settings.operation_timeout_secs {
        Some(secs) => println!("timeout           {}", secs),
        None => println!("timeout           none"),
    }
    if state.default_version.is_null() {
        println!("default-version   none");
    } else {
        println!("default-version   {}", state.default_version);
    }
    if let Some(latest) = state.latest_installed() {
        println!("latest-installed  {}", latest.version);
    }
    for (name, enabled) in settings.features.entries() {
        println!("{:<17} {}", name, enabled);
    }
    for location in &settings.custom_install_locations {
        println!("custom-location   {}", location.display());
    }
    Ok(())
}

async fn set(context: &Context, key: &str, value: &str) -> Result<()> {
    let hub = &context.hub;
    match key {
        "hub-location" => {
            let path = PathBuf::from(value);
            hub.update(move |state| state.settings.hub_location = path).await?;
        }
        "install-location" => {
            let path = PathBuf::from(value);
            hub.update(move |state| state.settings.install_location = path).await?;
            hub.refresh_installations().await?;
        }
        "project-location" => {
            let path = PathBuf::from(value);
            hub.update(move |state| state.settings.project_location = path).await?;
        }
        "timeout" => {
            let secs = match value {
                "none" | "0" => None,
                other => Some(
                    other
                        .parse::<u64>()
                        .with_context(|| format!("Invalid timeout: {}", other))?,
                ),
            };
            hub.update(move |state| state.settings.operation_timeout_secs = secs).await?;
        }
        "default-version" => {
            hub.set_default_version(parse_version(value)?).await?;
        }
        flag if FeatureFlags::NAMES.contains(&flag) => {
            let enabled = parse_bool(value)?;
            let name = flag.to_string();
            hub.update(move |state| {
                if let Some(slot) = state.settings.features.flag_mut(&name) {
                    *slot = enabled;
                }
            })
            .await?;
        }
        other => bail!(
            "Unknown setting: {} (expected hub-location, install-location, project-location, timeout, default-version or one of {})",
            other,
            FeatureFlags::NAMES.join(", ")
        ),
    }
    println!("{} = {}", key, value);
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "on" | "yes" => Ok(true),
        "false" | "off" | "no" => Ok(false),
        other => bail!("Expected true or false, got {}", other),
    }
}
