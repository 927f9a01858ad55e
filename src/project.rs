//! # Projects
//!
//! A project is a directory containing both an `Assets` and a
//! `ProjectSettings` entry. The hub remembers, per project path, a display
//! name, a pin flag, an icon tag, the editor version the project should open
//! with, and an opaque bag of advanced settings.
//!
//! When a project is first added its name comes from the directory name and
//! its version from `ProjectSettings/ProjectVersion.txt`. After that the
//! stored record is authoritative, so a version the user picked survives
//! later rescans.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::command::CommandLine;
use crate::installation::Installation;
use crate::version::EditorVersion;

pub const ASSETS_DIR: &str = "Assets";
pub const PROJECT_SETTINGS_DIR: &str = "ProjectSettings";
pub const PROJECT_VERSION_FILE: &str = "ProjectVersion.txt";
const EDITOR_VERSION_KEY: &str = "m_EditorVersion:";

/// Icon tag given to newly added projects.
pub const DEFAULT_ICON_TAG: &str = "📁";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub path: PathBuf,
    pub name: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default = "default_icon_tag")]
    pub icon_tag: String,
    #[serde(default)]
    pub version: EditorVersion,
    #[serde(default)]
    pub advanced_settings: serde_json::Value,
}

fn default_icon_tag() -> String {
    DEFAULT_ICON_TAG.to_string()
}

impl Project {
    /// Builds a fresh record from the project directory on disk.
    pub fn read_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let version = read_project_version(&path).unwrap_or_default();

        Self {
            path,
            name,
            pinned: false,
            icon_tag: default_icon_tag(),
            version,
            advanced_settings: serde_json::Value::Null,
        }
    }

    /// The installed, non-installing record matching this project's version.
    pub fn matching_installation<'a>(
        &self,
        installations: &'a [Installation],
    ) -> Option<&'a Installation> {
        installations
            .iter()
            .find(|install| install.version == self.version && !install.installing)
    }

    /// `<editor> -projectPath <project>` for the matching installation.
    pub fn launch_command(&self, installations: &[Installation]) -> Option<CommandLine> {
        let install = self.matching_installation(installations)?;
        Some(
            CommandLine::new(install.executable_path())
                .arg("-projectPath")
                .arg(self.path.to_string_lossy()),
        )
    }
}

/// True when `path` has both project marker entries.
pub fn is_project_dir(path: &Path) -> bool {
    path.join(ASSETS_DIR).exists() && path.join(PROJECT_SETTINGS_DIR).exists()
}

/// Reads `m_EditorVersion` from `ProjectSettings/ProjectVersion.txt`.
pub fn read_project_version(project: &Path) -> Option<EditorVersion> {
    let file = project.join(PROJECT_SETTINGS_DIR).join(PROJECT_VERSION_FILE);
    let content = match fs::read_to_string(&file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {}: {}", file.display(), e);
            return None;
        }
    };

    content
        .lines()
        .find_map(|line| line.trim().strip_prefix(EDITOR_VERSION_KEY))
        .and_then(|raw| EditorVersion::try_parse(raw.trim()))
}
