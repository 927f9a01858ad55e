//! # Hub Settings
//!
//! `HubSettings` is the explicit configuration handed to the reconciliation
//! engine and the operation orchestrator. It lives inside the persisted hub
//! state, so user edits and self-healing removals both go through the same
//! state-owning task.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::CommandLine;
use crate::defaults::{self, DEFAULT_HUB_LOCATION, DEFAULT_INSTALL_LOCATION, HUB_EXECUTABLE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HubSettings {
    /// The hub application bundle providing the headless installer.
    pub hub_location: PathBuf,
    /// Root scanned for installed editors.
    pub install_location: PathBuf,
    /// Where new projects are created.
    pub project_location: PathBuf,
    /// Installations living outside `install_location`, one directory each.
    pub custom_install_locations: Vec<PathBuf>,
    #[serde(flatten)]
    pub features: FeatureFlags,
    /// Install operations still running after this many seconds are treated
    /// as failed. `None` waits indefinitely.
    pub operation_timeout_secs: Option<u64>,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            hub_location: PathBuf::from(DEFAULT_HUB_LOCATION),
            install_location: PathBuf::from(DEFAULT_INSTALL_LOCATION),
            project_location: defaults::default_project_location(),
            custom_install_locations: Vec::new(),
            features: FeatureFlags::default(),
            operation_timeout_secs: None,
        }
    }
}

impl HubSettings {
    /// `<hub>/Contents/MacOS/Unity Hub -- --headless`
    pub fn command_base(&self) -> CommandLine {
        CommandLine::new(self.hub_location.join(HUB_EXECUTABLE)).args(["--", "--headless"])
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }

    /// Adds a custom install location; returns false if it was already listed.
    pub fn add_custom_install_location(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.custom_install_locations.contains(&path) {
            return false;
        }
        self.custom_install_locations.push(path);
        true
    }

    pub fn remove_custom_install_location(&mut self, path: &Path) -> bool {
        let before = self.custom_install_locations.len();
        self.custom_install_locations.retain(|p| p != path);
        self.custom_install_locations.len() != before
    }
}

/// Presentation toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureFlags {
    pub use_emoji: bool,
    pub use_pins: bool,
    pub show_location: bool,
    pub show_file_size: bool,
    pub use_small_sidebar: bool,
    pub show_sidebar_count: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            use_emoji: true,
            use_pins: true,
            show_location: false,
            show_file_size: false,
            use_small_sidebar: false,
            show_sidebar_count: true,
        }
    }
}

impl FeatureFlags {
    pub const NAMES: &'static [&'static str] = &[
        "emoji",
        "pins",
        "show-location",
        "show-filesize",
        "small-sidebar",
        "sidebar-count",
    ];

    /// Mutable access to a flag by its CLI name.
    pub fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "emoji" => Some(&mut self.use_emoji),
            "pins" => Some(&mut self.use_pins),
            "show-location" => Some(&mut self.show_location),
            "show-filesize" => Some(&mut self.show_file_size),
            "small-sidebar" => Some(&mut self.use_small_sidebar),
            "sidebar-count" => Some(&mut self.show_sidebar_count),
            _ => None,
        }
    }

    pub fn entries(&self) -> [(&'static str, bool); 6] {
        [
            ("emoji", self.use_emoji),
            ("pins", self.use_pins),
            ("show-location", self.show_location),
            ("show-filesize", self.show_file_size),
            ("small-sidebar", self.use_small_sidebar),
            ("sidebar-count", self.show_sidebar_count),
        ]
    }
}
