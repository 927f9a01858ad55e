//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Context};

/// Editor Hub - Manage installed Unity editors and their projects
#[derive(Parser, Debug)]
#[command(name = "editor-hub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Path to the hub state file.
    ///
    /// Defaults to `HubData.json` in the platform data directory.
    #[arg(long, global = true, value_name = "FILE", env = "EDITOR_HUB_STATE")]
    state_file: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List installed editor versions
    Installs(commands::installs::InstallsArgs),

    /// Install an editor version, or add modules to an installed one
    Install(commands::install::InstallArgs),

    /// Uninstall an editor version
    Uninstall(commands::uninstall::UninstallArgs),

    /// List or remove modules of an installed editor
    Modules(commands::modules::ModulesArgs),

    /// Add or remove an installation outside the install location
    Locate(commands::locate::LocateArgs),

    /// Manage the project list
    Projects(commands::projects::ProjectsArgs),

    /// Open a project in its editor
    Open(commands::open::OpenArgs),

    /// Show or change hub settings
    Settings(commands::settings::SettingsArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .init();

        let Cli {
            command,
            state_file,
            color,
            ..
        } = self;
        match command {
            Commands::Completions(args) => commands::completions::execute(args),
            command => {
                let context = Context::start(state_file, &color).await?;
                dispatch(command, &context).await
            }
        }
    }
}

async fn dispatch(command: Commands, context: &Context) -> Result<()> {
    match command {
        Commands::Installs(args) => commands::installs::execute(context, args).await,
        Commands::Install(args) => commands::install::execute(context, args).await,
        Commands::Uninstall(args) => commands::uninstall::execute(context, args).await,
        Commands::Modules(args) => commands::modules::execute(context, args).await,
        Commands::Locate(args) => commands::locate::execute(context, args).await,
        Commands::Projects(args) => commands::projects::execute(context, args).await,
        Commands::Open(args) => commands::open::execute(context, args).await,
        Commands::Settings(args) => commands::settings::execute(context, args).await,
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
