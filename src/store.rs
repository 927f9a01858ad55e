//! # Persisted Hub State
//!
//! All hub state lives in one JSON file per user: the install id, the
//! settings, the default editor version, the project list and the last known
//! installation list.
//!
//! ## Loading
//!
//! `Store::load` never fails. A missing or malformed file is replaced by a
//! fresh default state, which is written back immediately; a malformed file
//! is first moved aside to `HubData.json.bak`. Every successful load runs
//! `HubState::validated`, which drops records that are no longer usable and
//! removes duplicates.
//!
//! ## Saving
//!
//! `Store::save` writes to a temporary sibling and renames it over the state
//! file, so a crash mid-write leaves the previous state intact.

use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::Result;
use crate::installation::Installation;
use crate::project::Project;
use crate::settings::HubSettings;
use crate::version::EditorVersion;

/// Everything the hub persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HubState {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    #[serde(flatten)]
    pub settings: HubSettings,
    #[serde(default)]
    pub default_version: EditorVersion,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub versions: Vec<Installation>,
}

impl Default for HubState {
    fn default() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            settings: HubSettings::default(),
            default_version: EditorVersion::NULL,
            projects: Vec::new(),
            versions: Vec::new(),
        }
    }
}

impl HubState {
    /// Drops unusable records and de-duplicates by identity.
    ///
    /// Projects whose directory is gone and installations with a null
    /// version are removed. For duplicate identities the entry seen last
    /// wins and takes the later position. Module lists are reread from each
    /// installation's `modules.json`.
    pub fn validated(mut self) -> Self {
        let projects: Vec<Project> = self
            .projects
            .into_iter()
            .filter(|project| {
                let exists = project.path.exists();
                if !exists {
                    warn!("Dropping project {}: directory is gone", project.path.display());
                }
                exists
            })
            .collect();
        self.projects = keep_last_by(projects, |project| project.path.clone());

        let versions: Vec<Installation> = self
            .versions
            .into_iter()
            .filter(|install| {
                if install.version.is_null() {
                    warn!("Dropping installation record without a valid version");
                }
                !install.version.is_null()
            })
            .collect();
        self.versions = keep_last_by(versions, |install| install.version);
        for install in self.versions.iter_mut().filter(|i| !i.path.as_os_str().is_empty()) {
            install.reload_modules();
        }

        self
    }

    /// The newest installed version, if any.
    pub fn latest_installed(&self) -> Option<&Installation> {
        self.versions.first()
    }

    pub fn installation(&self, version: &EditorVersion) -> Option<&Installation> {
        self.versions.iter().find(|install| &install.version == version)
    }

    pub fn project(&self, path: &Path) -> Option<&Project> {
        self.projects.iter().find(|project| project.path == path)
    }

    pub fn project_mut(&mut self, path: &Path) -> Option<&mut Project> {
        self.projects.iter_mut().find(|project| project.path == path)
    }
}

fn keep_last_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    let mut kept: Vec<T> = items
        .into_iter()
        .rev()
        .filter(|item| seen.insert(key(item)))
        .collect();
    kept.reverse();
    kept
}

/// Reads and writes the hub state file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at the platform default location.
    pub fn at_default_location() -> Self {
        Self::new(defaults::default_state_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and validates the state, falling back to a fresh default.
    pub fn load(&self) -> HubState {
        match self.read() {
            Ok(state) => state.validated(),
            Err(e) => {
                if self.path.exists() {
                    warn!("Could not load {}: {}", self.path.display(), e);
                    self.back_up_unreadable();
                } else {
                    debug!("No state at {}, starting fresh", self.path.display());
                }
                let state = HubState::default();
                if let Err(e) = self.save(&state) {
                    warn!("Could not write fresh state to {}: {}", self.path.display(), e);
                }
                state
            }
        }
    }

    fn read(&self) -> Result<HubState> {
        let data = fs::read(&self.path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    fn back_up_unreadable(&self) {
        let backup = self.path.with_extension("json.bak");
        if let Err(e) = fs::rename(&self.path, &backup) {
            warn!("Could not move {} aside: {}", self.path.display(), e);
        }
    }

    /// Overwrites the state file with `state`.
    pub fn save(&self, state: &HubState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(state)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, data)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
