//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `editor-hub` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared `Context` and the parsed
//!   `Args` and performs the command's logic through the `editor_hub::Hub`.
//!
//! Commands that start background operations wait for them to finish, since
//! the operations stop when the process exits.

pub mod completions;
pub mod install;
pub mod installs;
pub mod locate;
pub mod modules;
pub mod open;
pub mod projects;
pub mod settings;
pub mod uninstall;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use indicatif::{ProgressBar, ProgressStyle};

use editor_hub::command::SystemRunner;
use editor_hub::orchestrator::{Hub, OperationHandle, OperationStatus};
use editor_hub::output::{emoji, OutputConfig};
use editor_hub::store::Store;
use editor_hub::version::EditorVersion;

/// What every hub command needs.
pub struct Context {
    pub hub: Hub,
    pub output: OutputConfig,
}

impl Context {
    /// Loads the state file and starts the hub.
    pub async fn start(state_file: Option<PathBuf>, color: &str) -> Result<Self> {
        let store = state_file.map(Store::new).unwrap_or_else(Store::at_default_location);
        let hub = Hub::start(store, Arc::new(SystemRunner));
        let state = hub.snapshot().await?;
        let output = OutputConfig::from_env_and_flag(color).with_features(&state.settings.features);
        Ok(Self { hub, output })
    }
}

pub fn parse_version(input: &str) -> Result<EditorVersion> {
    Ok(input.parse::<EditorVersion>()?)
}

/// Resolves `path` against the current directory without touching the disk.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Asks for confirmation unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let theme = ColorfulTheme::default();
    Ok(Confirm::with_theme(&theme)
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Waits for `handle` behind a spinner and returns the final status.
pub async fn wait_with_spinner(handle: &OperationHandle, message: String) -> Result<OperationStatus> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let status = handle.wait().await;
    spinner.finish_and_clear();
    Ok(status)
}

/// Prints the outcome of a finished operation; anything but success is an
/// error.
pub fn report(output: &OutputConfig, status: &OperationStatus, done: &str) -> Result<()> {
    match status {
        OperationStatus::Succeeded => {
            println!("{} {}", emoji(output, "✅", "[ok]"), done);
            Ok(())
        }
        OperationStatus::Failed { output: text } => {
            let text = text.trim();
            if !text.is_empty() {
                eprintln!("{}", text);
            }
            bail!("Operation failed")
        }
        OperationStatus::TimedOut => bail!("Operation timed out"),
        OperationStatus::Cancelled => bail!("Operation was cancelled"),
        OperationStatus::Running => bail!("Operation did not finish"),
    }
}
