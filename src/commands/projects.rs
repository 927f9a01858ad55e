//! # Projects Command Implementation
//!
//! Manages the hub's project list: listing (after dropping projects whose
//! directory is gone), adding and removing projects, pinning, icon tags, and
//! overriding the editor version a project opens with. Advanced settings are
//! stored as opaque JSON.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};

use editor_hub::output::emoji;
use editor_hub::project::Project;

use super::{absolute, parse_version, Context};

/// Manage the project list
#[derive(Args, Debug)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    pub command: ProjectsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ProjectsCommand {
    /// List known projects
    List {
        /// Print the list as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add a project directory
    Add {
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Remove a project from the list (files are kept)
    Remove {
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Pin a project to the top of the list
    Pin {
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Unpin a project
    Unpin {
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Set the icon tag shown next to a project
    Icon {
        #[arg(value_name = "DIR")]
        path: PathBuf,
        #[arg(value_name = "TAG")]
        tag: String,
    },
    /// Set the editor version a project opens with
    SetVersion {
        #[arg(value_name = "DIR")]
        path: PathBuf,
        #[arg(value_name = "VERSION")]
        version: String,
    },
    /// Replace a project's advanced settings with a JSON value
    Advanced {
        #[arg(value_name = "DIR")]
        path: PathBuf,
        #[arg(value_name = "JSON")]
        settings: String,
    },
}

/// Execute the `projects` command.
pub async fn execute(context: &Context, args: ProjectsArgs) -> Result<()> {
    match args.command {
        ProjectsCommand::List { json } => list(context, json).await,
        ProjectsCommand::Add { path } => {
            let project = context.hub.add_project(absolute(&path)).await?;
            println!(
                "{} Added {} ({})",
                emoji(&context.output, "✅", "[ok]"),
                project.name,
                project.version
            );
            Ok(())
        }
        ProjectsCommand::Remove { path } => {
            context.hub.remove_project(absolute(&path)).await?;
            println!("Removed {}", path.display());
            Ok(())
        }
        ProjectsCommand::Pin { path } => {
            let project = context
                .hub
                .edit_project(absolute(&path), |project| project.pinned = true)
                .await?;
            println!("Pinned {}", project.name);
            Ok(())
        }
        ProjectsCommand::Unpin { path } => {
            let project = context
                .hub
                .edit_project(absolute(&path), |project| project.pinned = false)
                .await?;
            println!("Unpinned {}", project.name);
            Ok(())
        }
        ProjectsCommand::Icon { path, tag } => {
            let project = context
                .hub
                .edit_project(absolute(&path), move |project| project.icon_tag = tag)
                .await?;
            println!("{} {}", project.icon_tag, project.name);
            Ok(())
        }
        ProjectsCommand::SetVersion { path, version } => {
            let version = parse_version(&version)?;
            let project = context
                .hub
                .edit_project(absolute(&path), move |project| project.version = version)
                .await?;
            println!("{} now opens with {}", project.name, project.version);
            Ok(())
        }
        ProjectsCommand::Advanced { path, settings } => {
            let settings: serde_json::Value = serde_json::from_str(&settings)
                .with_context(|| format!("Invalid JSON: {}", settings))?;
            let project = context
                .hub
                .edit_project(absolute(&path), move |project| {
                    project.advanced_settings = settings
                })
                .await?;
            println!("Updated advanced settings of {}", project.name);
            Ok(())
        }
    }
}

async fn list(context: &Context, json: bool) -> Result<()> {
    let mut projects = context.hub.refresh_projects().await?;
    let state = context.hub.snapshot().await?;
    let features = state.settings.features;
    if features.use_pins {
        // Stable sort keeps the name order within each group.
        projects.sort_by_key(|project| !project.pinned);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    let output = &context.output;
    for project in &projects {
        let marker = if features.use_pins && project.pinned {
            emoji(output, "📌", "*")
        } else {
            " "
        };
        let available = project.matching_installation(&state.versions).is_some();
        let mut line = format!(
            "{} {} {}  {}",
            marker,
            project.icon_tag,
            output.bold(&project.name),
            version_label(project, available)
        );
        if features.show_location {
            line.push_str(&format!("  {}", output.dim(&project.path.display().to_string())));
        }
        println!("{}", line);
    }

    if features.show_sidebar_count {
        println!("{} projects", projects.len());
    }
    Ok(())
}

fn version_label(project: &Project, available: bool) -> String {
    if project.version.is_null() {
        "unknown version".to_string()
    } else if available {
        project.version.to_string()
    } else {
        format!("{} (not installed)", project.version)
    }
}
