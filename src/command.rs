//! # External Commands
//!
//! Installing editors and modules is delegated to the hub executable, and
//! opening a project launches the editor binary. Both are opaque programs:
//! this crate builds their command lines, runs them, and looks only at the
//! text they print.
//!
//! ## Success detection
//!
//! The hub reports a finished install only in its output text, so success is
//! decided by `SuccessCheck::OutputContains(INSTALL_SUCCESS_PHRASE)`. Callers
//! receive an `ExternalCommandResult` and never look at the output
//! themselves; switching to `SuccessCheck::ExitStatus` changes the rule in one
//! place.
//!
//! ## Runners
//!
//! `CommandRunner` is the seam between the orchestrator and the operating
//! system. `SystemRunner` uses `std::process::Command`; tests substitute
//! scripted runners.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};
use crate::version::EditorVersion;

/// Output fragment the hub prints after a successful install.
pub const INSTALL_SUCCESS_PHRASE: &str = "successfully downloaded";

/// Subcommand of the hub's headless CLI that installs editors and modules.
pub const INSTALL_SUBCOMMAND: &str = "im";

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `<base> im --version <version> [-m <module>]... --cm`
pub fn install_command(
    base: &CommandLine,
    version: &EditorVersion,
    module_ids: &[String],
) -> CommandLine {
    let mut command = base
        .clone()
        .arg(INSTALL_SUBCOMMAND)
        .arg("--version")
        .arg(version.to_string());
    for id in module_ids {
        command = command.arg("-m").arg(id.as_str());
    }
    command.arg("--cm")
}

/// How a finished command is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessCheck {
    /// Succeeded when the combined output contains the phrase.
    OutputContains(String),
    /// Succeeded when the process exits with status zero.
    ExitStatus,
}

impl SuccessCheck {
    pub fn install() -> Self {
        SuccessCheck::OutputContains(INSTALL_SUCCESS_PHRASE.to_string())
    }

    pub fn evaluate(&self, exited_ok: bool, output: &str) -> bool {
        match self {
            SuccessCheck::OutputContains(phrase) => output.contains(phrase.as_str()),
            SuccessCheck::ExitStatus => exited_ok,
        }
    }
}

/// Outcome of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommandResult {
    pub succeeded: bool,
    pub raw_output: String,
}

/// Runs external programs. Implementations block the calling thread.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion and judges it with `check`.
    fn run(&self, command: &CommandLine, check: &SuccessCheck) -> Result<ExternalCommandResult>;

    /// Starts `command` without waiting for it.
    fn spawn_detached(&self, command: &CommandLine) -> Result<()>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandLine, check: &SuccessCheck) -> Result<ExternalCommandResult> {
        debug!("Running {}", command);
        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::CommandLaunch {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        let mut raw_output = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.is_empty() {
            raw_output.push('\n');
            raw_output.push_str(&stderr);
        }

        Ok(ExternalCommandResult {
            succeeded: check.evaluate(output.status.success(), &raw_output),
            raw_output,
        })
    }

    fn spawn_detached(&self, command: &CommandLine) -> Result<()> {
        debug!("Launching {}", command);
        Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::CommandLaunch {
                command: command.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
