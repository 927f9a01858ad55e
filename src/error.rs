//! # Error Handling
//!
//! This module defines the centralized error type for `editor-hub`. It uses
//! the `thiserror` library to build a single `Error` enum covering every
//! failure that can reach a caller of the library.
//!
//! Most failures never get this far. Unparseable versions become the null
//! sentinel, invalid editor bundles and stale paths are dropped during
//! reconciliation, and unreadable files fall back to safe defaults; all of
//! these are logged instead of returned. What remains here are the failures
//! of explicit user requests:
//!
//! - Uninstalling or modifying a version that is busy with another operation.
//! - Referring to a version, module or project that is not known.
//! - Opening a project whose editor version is not installed.
//! - Launching an external command.
//! - Talking to a hub whose state task has shut down.
//!
//! I/O, JSON and property-list errors are wrapped via `#[from]` so they can be
//! propagated with `?` inside the library.

use thiserror::Error;

/// Main error type for editor-hub operations
#[derive(Error, Debug)]
pub enum Error {
    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A property-list parsing error, wrapped from `plist::Error`.
    #[error("Property list error: {0}")]
    Plist(#[from] plist::Error),

    /// The external command could not be started at all.
    #[error("Failed to launch `{command}`: {message}")]
    CommandLaunch { command: String, message: String },

    /// Another operation is already running against this version.
    #[error("Version {version} is busy: {operation} in progress")]
    Busy { version: String, operation: String },

    /// No installation record exists for the requested version.
    #[error("Version {version} is not installed")]
    NotInstalled { version: String },

    /// The string could not be parsed as an editor version.
    #[error("Invalid editor version: {input}")]
    InvalidVersion { input: String },

    /// The module is not selected on the installation, or is not a known module.
    #[error("Module {module} is not installed for version {version}")]
    UnknownModule { version: String, module: String },

    /// The path is not in the project list.
    #[error("Project not found: {path}")]
    ProjectNotFound { path: String },

    /// The directory is not a usable project.
    #[error("Invalid project at {path}: {message}")]
    InvalidProject { path: String, message: String },

    /// The project references an editor version that is not installed.
    #[error("Project {project} needs editor {version}, which is not installed")]
    MissingInstallation { project: String, version: String },

    /// The state-owning task is no longer running.
    #[error("Hub state task has shut down")]
    HubClosed,

    /// A background task panicked or was aborted.
    #[error("Background task failed: {message}")]
    Task { message: String },
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Task {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_busy() {
        let error = Error::Busy {
            version: "2021.3.5f1".to_string(),
            operation: "install".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("2021.3.5f1"));
        assert!(display.contains("busy"));
        assert!(display.contains("install"));
    }

    #[test]
    fn test_error_display_missing_installation() {
        let error = Error::MissingInstallation {
            project: "/work/Game".to_string(),
            version: "2020.3.1f1".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("/work/Game"));
        assert!(display.contains("2020.3.1f1"));
        assert!(display.contains("not installed"));
    }

    #[test]
    fn test_error_display_command_launch() {
        let error = Error::CommandLaunch {
            command: "Unity Hub -- --headless im".to_string(),
            message: "No such file or directory".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to launch"));
        assert!(display.contains("No such file or directory"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_unknown_module() {
        let error = Error::UnknownModule {
            version: "2019.4.0f1".to_string(),
            module: "android".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("android"));
        assert!(display.contains("2019.4.0f1"));
    }
}
