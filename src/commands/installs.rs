//! # Installs Command Implementation
//!
//! Lists installed editor versions, newest first. The install locations are
//! rescanned first so the list reflects the disk, unless `--cached` is given.
//!
//! Columns follow the hub's presentation flags: `showLocation` adds the
//! install path and `showFileSize` adds the size on disk.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use editor_hub::installation::Installation;
use editor_hub::output::{emoji, format_size};
use editor_hub::reconcile;
use editor_hub::store::HubState;

use super::Context;

/// List installed editor versions
#[derive(Args, Debug)]
pub struct InstallsArgs {
    /// Print the stored list without rescanning the install locations.
    #[arg(long)]
    pub cached: bool,

    /// Print the list as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InstallRow {
    version: String,
    path: String,
    installing: bool,
    lts: bool,
    default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

/// Execute the `installs` command.
pub async fn execute(context: &Context, args: InstallsArgs) -> Result<()> {
    if !args.cached {
        context.hub.refresh_installations().await?;
    }
    let state = context.hub.snapshot().await?;
    let rows = rows(&state).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No editors installed.");
        return Ok(());
    }

    let output = &context.output;
    let features = &state.settings.features;
    for row in &rows {
        let mut line = format!("{} {}", emoji(output, "🎮", "-"), output.bold(&row.version));
        if row.lts {
            line.push_str(" (LTS)");
        }
        if row.default {
            line.push_str(&format!(" {}", emoji(output, "⭐", "[default]")));
        }
        if row.installing {
            line.push_str(" installing...");
        }
        if features.show_location && !row.path.is_empty() {
            line.push_str(&format!("  {}", output.dim(&row.path)));
        }
        if let Some(size) = row.size {
            line.push_str(&format!("  {}", format_size(size)));
        }
        println!("{}", line);
    }

    if features.show_sidebar_count {
        println!("{} installed", rows.iter().filter(|row| !row.installing).count());
    }
    Ok(())
}

async fn rows(state: &HubState) -> Result<Vec<InstallRow>> {
    let show_size = state.settings.features.show_file_size;
    let versions: Vec<Installation> = state.versions.clone();
    let default_version = state.default_version;

    let rows = tokio::task::spawn_blocking(move || {
        versions
            .iter()
            .map(|install| InstallRow {
                version: install.version.to_string(),
                path: install.path.display().to_string(),
                installing: install.installing,
                lts: install.version.is_lts(),
                default: install.version == default_version,
                size: (show_size && !install.is_placeholder())
                    .then(|| reconcile::disk_usage(&install.path)),
            })
            .collect::<Vec<InstallRow>>()
    })
    .await?;
    Ok(rows)
}
