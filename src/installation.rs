//! Installed editor versions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::module::{self, KnownModule, ModuleRecord};
use crate::version::EditorVersion;

/// Name of the application bundle inside an installation directory.
pub const EDITOR_BUNDLE: &str = "Unity.app";

/// One installed (or installing) editor version.
///
/// Identity is the version: two records with the same version never coexist
/// in a reconciled list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub version: EditorVersion,
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub installing: bool,
    /// Loaded from the installation's `modules.json`, which owns this data.
    #[serde(skip)]
    pub modules: Vec<ModuleRecord>,
}

impl Installation {
    /// A discovered installation, with its module list read from disk.
    pub fn discovered(version: EditorVersion, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let modules = module::load_modules(&path);
        Self {
            version,
            path,
            installing: false,
            modules,
        }
    }

    /// A record tracking an install that has not produced a directory yet.
    pub fn placeholder(version: EditorVersion) -> Self {
        Self {
            version,
            path: PathBuf::new(),
            installing: true,
            modules: Vec::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.installing && self.path.as_os_str().is_empty()
    }

    pub fn bundle_path(&self) -> PathBuf {
        bundle_path(&self.path)
    }

    /// The editor binary used to open projects.
    pub fn executable_path(&self) -> PathBuf {
        self.bundle_path().join("Contents").join("MacOS").join("Unity")
    }

    pub fn reload_modules(&mut self) {
        self.modules = module::load_modules(&self.path);
    }

    pub fn installed_modules(&self) -> Vec<&'static KnownModule> {
        module::installed_modules(&self.modules)
    }

    pub fn available_modules(&self) -> Vec<&'static KnownModule> {
        module::available_modules(&self.modules)
    }
}

pub fn bundle_path(install_path: &Path) -> PathBuf {
    install_path.join(EDITOR_BUNDLE)
}

/// `Unity.app/Contents/Info.plist` under an installation directory.
pub fn info_plist_path(install_path: &Path) -> PathBuf {
    bundle_path(install_path).join("Contents").join("Info.plist")
}

/// Sorts newest first, so index 0 is the latest installed version.
pub fn sort_newest_first(installations: &mut [Installation]) {
    installations.sort_by(|a, b| b.version.cmp(&a.version));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_has_no_path() {
        let record = Installation::placeholder(EditorVersion::parse("2022.3.1f1"));
        assert!(record.installing);
        assert!(record.is_placeholder());
    }

    #[test]
    fn test_executable_path() {
        let record = Installation {
            version: EditorVersion::parse("2021.3.5f1"),
            path: PathBuf::from("/Editors/2021.3.5f1"),
            installing: false,
            modules: Vec::new(),
        };
        assert_eq!(
            record.executable_path(),
            PathBuf::from("/Editors/2021.3.5f1/Unity.app/Contents/MacOS/Unity")
        );
        assert!(!record.is_placeholder());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut records: Vec<_> = ["2020.3.1f1", "2021.3.0c1", "2021.3.0f1", "2019.4.0f1"]
            .iter()
            .map(|v| Installation::placeholder(EditorVersion::parse(v)))
            .collect();
        sort_newest_first(&mut records);
        let order: Vec<_> = records.iter().map(|r| r.version.to_string()).collect();
        assert_eq!(order, vec!["2021.3.0f1", "2021.3.0c1", "2020.3.1f1", "2019.4.0f1"]);
    }

    #[test]
    fn test_modules_not_serialized() {
        let mut record = Installation::placeholder(EditorVersion::parse("2021.3.5f1"));
        record.modules.push(ModuleRecord::new("android", true));
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("modules").is_none());
        assert_eq!(json["version"], "2021.3.5f1");
        assert_eq!(json["installing"], true);
    }
}
