//! Default values for editor-hub configuration.
//!
//! This module provides centralized default locations used by the settings
//! and the persisted store, so the CLI and the library agree on them.

use std::path::PathBuf;

/// Hub application bundle that provides the headless installer.
pub const DEFAULT_HUB_LOCATION: &str = "/Applications/Unity Hub.app";

/// Executable inside the hub bundle.
pub const HUB_EXECUTABLE: &str = "Contents/MacOS/Unity Hub";

/// Directory the hub installs editors into, one subdirectory per version.
pub const DEFAULT_INSTALL_LOCATION: &str = "/Applications/Unity/Hub/Editor";

/// File name of the persisted hub state.
pub const STATE_FILE_NAME: &str = "HubData.json";

/// Returns the default location of the persisted hub state.
///
/// Uses the platform data directory:
/// - Linux: `~/.local/share/editor-hub/HubData.json`
/// - macOS: `~/Library/Application Support/editor-hub/HubData.json`
/// - Windows: `{FOLDERID_RoamingAppData}\editor-hub\HubData.json`
///
/// Falls back to `.editor-hub` in the current directory if the platform
/// directory cannot be determined. The CLI's `--state-file` flag and the
/// `EDITOR_HUB_STATE` environment variable override it.
pub fn default_state_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".editor-hub"))
        .join("editor-hub")
        .join(STATE_FILE_NAME)
}

/// Returns the default directory new projects are created in: the home
/// directory, or `~` when it cannot be determined.
pub fn default_project_location() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"))
}
