//! # Reconciliation
//!
//! The filesystem is the source of truth for what is installed. Editors can
//! be deleted, moved or added behind the hub's back, so every refresh
//! rebuilds the installation list from disk and merges it with the
//! previously persisted list.
//!
//! ## Installations
//!
//! 1. **Install root**: every immediate subdirectory whose bundle validates
//!    becomes an installation, versioned by the directory name.
//! 2. **Custom roots**: each configured custom location is a single
//!    installation directory. Locations that no longer exist, or that hold no
//!    `Unity.app`, are reported as missing so the caller can drop them from
//!    the settings.
//! 3. **Merge**: scanned records replace persisted ones with the same
//!    version. Persisted records without a scanned counterpart are dropped,
//!    except in-flight installs, which are kept until the scan finds them.
//! 4. **Order**: newest version first.
//!
//! ## Bundle validation
//!
//! A directory is an editor installation when
//! `Unity.app/Contents/Info.plist` parses and its `CFBundleIdentifier`
//! contains [`EDITOR_BUNDLE_ID`]. Every failure is logged and treated as
//! "not an installation".
//!
//! ## Projects
//!
//! Project paths that no longer exist or lack the `Assets`/`ProjectSettings`
//! markers are dropped, known projects keep their stored metadata, new ones
//! are read from disk, and the result is sorted by name.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::installation::{self, Installation, EDITOR_BUNDLE};
use crate::project::{self, Project};
use crate::version::EditorVersion;

/// Substring every genuine editor bundle identifier contains.
pub const EDITOR_BUNDLE_ID: &str = "com.unity3d.UnityEditor";

#[derive(Debug, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleIdentifier")]
    bundle_identifier: Option<String>,
    #[serde(rename = "CFBundleVersion")]
    bundle_version: Option<String>,
}

/// Identification read from a validated editor bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleInfo {
    pub identifier: String,
    pub version: Option<String>,
}

/// Result of scanning the install root and custom locations.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    pub installations: Vec<Installation>,
    /// Custom locations that should be removed from the settings.
    pub missing_custom_roots: Vec<PathBuf>,
}

/// Reads and checks the bundle metadata of the installation at `path`.
pub fn read_bundle_info(path: &Path) -> Option<BundleInfo> {
    let plist_path = installation::info_plist_path(path);
    let info: InfoPlist = match plist::from_file(&plist_path) {
        Ok(info) => info,
        Err(e) => {
            warn!("No valid bundle metadata at {}: {}", plist_path.display(), e);
            return None;
        }
    };

    let Some(identifier) = info.bundle_identifier else {
        warn!("No bundle identifier in {}", plist_path.display());
        return None;
    };

    if !identifier.contains(EDITOR_BUNDLE_ID) {
        warn!(
            "Invalid bundle identifier '{}' in {}",
            identifier,
            plist_path.display()
        );
        return None;
    }

    Some(BundleInfo {
        identifier,
        version: info.bundle_version,
    })
}

/// True when `path` holds a genuine editor bundle.
pub fn validate_editor(path: &Path) -> bool {
    read_bundle_info(path).is_some()
}

/// Builds an installation record for a validated directory.
///
/// The version comes from the directory name, falling back to the bundle's
/// `CFBundleVersion` when the name does not parse.
fn installation_at(dir: &Path) -> Option<Installation> {
    let bundle = read_bundle_info(dir)?;

    let from_name = dir
        .file_name()
        .and_then(|name| EditorVersion::try_parse(&name.to_string_lossy()));
    let version = from_name.or_else(|| bundle.version.as_deref().and_then(EditorVersion::try_parse));

    match version {
        Some(version) => {
            debug!("Found editor {} at {}", version, dir.display());
            Some(Installation::discovered(version, dir))
        }
        None => {
            warn!("Cannot determine editor version for {}", dir.display());
            None
        }
    }
}

/// Validates every immediate subdirectory of `install_root` in parallel.
pub fn scan_install_root(install_root: &Path) -> Vec<Installation> {
    let candidates: Vec<PathBuf> = WalkDir::new(install_root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_dir() => Some(entry.into_path()),
            Ok(_) => None,
            Err(e) => {
                warn!("Cannot list {}: {}", install_root.display(), e);
                None
            }
        })
        .collect();

    candidates.par_iter().filter_map(|dir| installation_at(dir)).collect()
}

enum CustomRoot {
    Found(Installation),
    Missing,
    Rejected,
}

fn inspect_custom_root(root: &Path) -> CustomRoot {
    if !root.exists() {
        warn!("Custom install location {} no longer exists", root.display());
        return CustomRoot::Missing;
    }
    if !root.join(EDITOR_BUNDLE).exists() {
        warn!("Custom install location {} has no {}", root.display(), EDITOR_BUNDLE);
        return CustomRoot::Missing;
    }
    match installation_at(root) {
        Some(install) => CustomRoot::Found(install),
        None => CustomRoot::Rejected,
    }
}

/// Scans the install root and each custom location.
pub fn scan(install_root: &Path, custom_roots: &[PathBuf]) -> ScanOutcome {
    let mut outcome = ScanOutcome {
        installations: scan_install_root(install_root),
        missing_custom_roots: Vec::new(),
    };

    for root in custom_roots {
        match inspect_custom_root(root) {
            CustomRoot::Found(install) => outcome.installations.push(install),
            CustomRoot::Missing => outcome.missing_custom_roots.push(root.clone()),
            CustomRoot::Rejected => {}
        }
    }

    outcome
}

/// Merges freshly scanned records over the previous list.
///
/// Scanned records win over previous ones with the same version, and a later
/// scanned record wins over an earlier one. Previous records survive only
/// while they are in-flight installs. The result is sorted newest first.
pub fn merge(scanned: Vec<Installation>, previous: &[Installation]) -> Vec<Installation> {
    let mut by_version: BTreeMap<EditorVersion, Installation> = BTreeMap::new();

    for record in previous.iter().filter(|record| record.installing) {
        by_version.insert(record.version, record.clone());
    }
    for record in scanned.into_iter().filter(|record| !record.version.is_null()) {
        if let Some(replaced) = by_version.insert(record.version, record) {
            debug!("Replacing record for {} at {}", replaced.version, replaced.path.display());
        }
    }

    by_version.into_values().rev().collect()
}

/// Rebuilds the installation list, pruning missing custom locations from
/// `custom_roots`.
pub fn reconcile(
    install_root: &Path,
    custom_roots: &mut Vec<PathBuf>,
    previous: &[Installation],
) -> Vec<Installation> {
    let outcome = scan(install_root, custom_roots);
    custom_roots.retain(|root| !outcome.missing_custom_roots.contains(root));
    merge(outcome.installations, previous)
}

/// Validates project paths and resolves their records, sorted by name.
pub fn scan_projects(paths: &[PathBuf], previous: &[Project]) -> Vec<Project> {
    let mut seen = HashSet::new();
    let mut projects: Vec<Project> = paths
        .iter()
        .filter(|path| seen.insert((*path).clone()))
        .filter_map(|path| {
            if !path.exists() {
                warn!("Project {} no longer exists", path.display());
                return None;
            }
            if !project::is_project_dir(path) {
                warn!("{} is not a project directory", path.display());
                return None;
            }
            let record = previous
                .iter()
                .rev()
                .find(|known| &known.path == path)
                .cloned()
                .unwrap_or_else(|| Project::read_from(path));
            Some(record)
        })
        .collect();

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    projects
}

/// Rebuilds the project list and rewrites `paths` to exactly the survivors.
pub fn reconcile_projects(paths: &mut Vec<PathBuf>, previous: &[Project]) -> Vec<Project> {
    let projects = scan_projects(paths, previous);
    *paths = projects.iter().map(|project| project.path.clone()).collect();
    projects
}

/// Total size in bytes of the files under `path`.
pub fn disk_usage(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}
