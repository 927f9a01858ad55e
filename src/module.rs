//! # Editor Modules
//!
//! Every installation carries a `modules.json` side file listing the optional
//! components (platform support, documentation, language packs) that the
//! installer knows about for that version. Each entry has an `id` and a
//! `selected` flag; a module counts as installed only while `selected` is
//! true. Removing a module flips the flag and deletes the module payload, but
//! the entry itself stays in the file.
//!
//! The installer writes many more fields per entry than this crate reads.
//! Those are kept in `ModuleRecord::extra` so rewriting the file never drops
//! them.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File name of the per-installation module list.
pub const MODULES_FILE: &str = "modules.json";

/// One entry of `modules.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModuleRecord {
    pub fn new(id: impl Into<String>, selected: bool) -> Self {
        Self {
            id: id.into(),
            selected,
            extra: serde_json::Map::new(),
        }
    }

    /// Catalog entry for this module, if the id is known.
    pub fn known(&self) -> Option<&'static KnownModule> {
        lookup(&self.id)
    }
}

/// Static description of a module the installer can add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownModule {
    pub id: &'static str,
    pub name: &'static str,
    /// Modules sharing a platform are alternatives (e.g. Mono vs IL2CPP).
    pub platform: &'static str,
    /// Payload location relative to the installation directory.
    pub install_path: &'static str,
}

pub const MODULE_CATALOG: &[KnownModule] = &[
    KnownModule {
        id: "android",
        name: "Android Build Support",
        platform: "android",
        install_path: "PlaybackEngines/AndroidPlayer",
    },
    KnownModule {
        id: "ios",
        name: "iOS Build Support",
        platform: "ios",
        install_path: "PlaybackEngines/iOSSupport",
    },
    KnownModule {
        id: "appletv",
        name: "tvOS Build Support",
        platform: "tvos",
        install_path: "PlaybackEngines/AppleTVSupport",
    },
    KnownModule {
        id: "linux-mono",
        name: "Linux Build Support (Mono)",
        platform: "linux",
        install_path: "PlaybackEngines/LinuxStandaloneSupport",
    },
    KnownModule {
        id: "linux-il2cpp",
        name: "Linux Build Support (IL2CPP)",
        platform: "linux",
        install_path: "PlaybackEngines/LinuxStandaloneSupport",
    },
    KnownModule {
        id: "mac-il2cpp",
        name: "Mac Build Support (IL2CPP)",
        platform: "mac",
        install_path: "Unity.app/Contents/PlaybackEngines/MacStandaloneSupport/Variations/il2cpp",
    },
    KnownModule {
        id: "mac-mono",
        name: "Mac Build Support (Mono)",
        platform: "mac",
        install_path: "Unity.app/Contents/PlaybackEngines/MacStandaloneSupport/Variations/mono",
    },
    KnownModule {
        id: "windows-mono",
        name: "Windows Build Support (Mono)",
        platform: "windows",
        install_path: "PlaybackEngines/WindowsStandaloneSupport",
    },
    KnownModule {
        id: "webgl",
        name: "WebGL Build Support",
        platform: "webgl",
        install_path: "PlaybackEngines/WebGLSupport",
    },
    KnownModule {
        id: "lumin",
        name: "Lumin OS (Magic Leap) Build Support",
        platform: "lumin",
        install_path: "PlaybackEngines/LuminSupport",
    },
    KnownModule {
        id: "documentation",
        name: "Documentation",
        platform: "documentation",
        install_path: "Documentation",
    },
    KnownModule {
        id: "language-ja",
        name: "日本語 Language Pack",
        platform: "language-ja",
        install_path: "Unity.app/Contents/Localization/ja",
    },
    KnownModule {
        id: "language-ko",
        name: "한국어 Language Pack",
        platform: "language-ko",
        install_path: "Unity.app/Contents/Localization/ko",
    },
    KnownModule {
        id: "language-zh-hans",
        name: "简体中文 Language Pack",
        platform: "language-zh-hans",
        install_path: "Unity.app/Contents/Localization/zh-hans",
    },
    KnownModule {
        id: "language-zh-hant",
        name: "繁體中文 Language Pack",
        platform: "language-zh-hant",
        install_path: "Unity.app/Contents/Localization/zh-hant",
    },
];

pub fn lookup(id: &str) -> Option<&'static KnownModule> {
    MODULE_CATALOG.iter().find(|module| module.id == id)
}

/// Path of the side file for the installation at `install_path`.
pub fn modules_path(install_path: &Path) -> PathBuf {
    install_path.join(MODULES_FILE)
}

/// Reads `modules.json`; a missing or malformed file yields an empty list.
pub fn load_modules(install_path: &Path) -> Vec<ModuleRecord> {
    let path = modules_path(install_path);
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Could not read {}: {}", path.display(), e);
            }
            return Vec::new();
        }
    };

    match serde_json::from_slice(&data) {
        Ok(modules) => modules,
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

pub fn save_modules(install_path: &Path, modules: &[ModuleRecord]) -> Result<()> {
    let data = serde_json::to_vec_pretty(modules)?;
    fs::write(modules_path(install_path), data)?;
    Ok(())
}

/// Known, selected modules with one entry per platform; the first selected
/// module of a platform wins.
pub fn installed_modules(modules: &[ModuleRecord]) -> Vec<&'static KnownModule> {
    let mut installed: Vec<&'static KnownModule> = Vec::new();
    for known in modules
        .iter()
        .filter(|module| module.selected)
        .filter_map(ModuleRecord::known)
    {
        if !installed.iter().any(|m| m.platform == known.platform) {
            installed.push(known);
        }
    }
    installed
}

/// Catalog modules whose platform is not yet covered by an installed module.
pub fn available_modules(modules: &[ModuleRecord]) -> Vec<&'static KnownModule> {
    let installed = installed_modules(modules);
    MODULE_CATALOG
        .iter()
        .filter(|candidate| !installed.iter().any(|m| m.platform == candidate.platform))
        .collect()
}

/// Flips the selected entry for `id` to unselected.
///
/// Returns the payload path (relative to the installation) that should be
/// deleted, or `None` when no selected entry with a known payload exists.
pub fn deselect(modules: &mut [ModuleRecord], id: &str) -> Option<&'static str> {
    let known = lookup(id)?;
    let mut found = false;
    for module in modules.iter_mut().filter(|m| m.selected && m.id == id) {
        module.selected = false;
        found = true;
    }
    found.then_some(known.install_path)
}
