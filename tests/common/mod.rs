//! Shared test utilities for integration and E2E tests.
//!
//! This module provides fixtures that lay out fake editor installations and
//! projects on disk, plus a scripted command runner for driving the hub
//! without a real installer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = HubFixture::new().with_editor("2021.3.5f1");
//!     // ... test code
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};
use std::time::Duration;

use assert_fs::prelude::*;
use editor_hub::command::{CommandLine, CommandRunner, ExternalCommandResult, SuccessCheck};
use editor_hub::error::{Error, Result};
use editor_hub::store::{HubState, Store};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{write_editor, write_project, HubFixture, ScriptedRunner, EDITOR_BUNDLE_ID};
}

pub const EDITOR_BUNDLE_ID: &str = "com.unity3d.UnityEditor5.x";

/// Writes a minimal `Unity.app/Contents/Info.plist` under `install_dir`.
pub fn write_editor(install_dir: &Path, identifier: &str, bundle_version: &str) {
    let contents = install_dir.join("Unity.app").join("Contents");
    fs::create_dir_all(contents.join("MacOS")).expect("Failed to create bundle");
    let plist = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>CFBundleIdentifier</key>
    <string>{identifier}</string>
    <key>CFBundleVersion</key>
    <string>{bundle_version}</string>
</dict>
</plist>
"#
    );
    fs::write(contents.join("Info.plist"), plist).expect("Failed to write Info.plist");
}

/// Creates a project directory with `Assets/` and `ProjectSettings/`, and a
/// `ProjectVersion.txt` when `version` is given.
pub fn write_project(dir: &Path, version: Option<&str>) {
    fs::create_dir_all(dir.join("Assets")).expect("Failed to create Assets");
    fs::create_dir_all(dir.join("ProjectSettings")).expect("Failed to create ProjectSettings");
    if let Some(version) = version {
        fs::write(
            dir.join("ProjectSettings").join("ProjectVersion.txt"),
            format!("m_EditorVersion: {version}\nm_EditorVersionWithRevision: {version} (abcdef)\n"),
        )
        .expect("Failed to write ProjectVersion.txt");
    }
}

/// A temporary hub: an install root, a projects directory and a state file.
pub struct HubFixture {
    temp_dir: assert_fs::TempDir,
}

impl HubFixture {
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("Editors")
            .create_dir_all()
            .expect("Failed to create install root");
        Self { temp_dir }
    }

    /// Adds a valid editor named after its version under the install root.
    pub fn with_editor(self, version: &str) -> Self {
        write_editor(&self.install_root().join(version), EDITOR_BUNDLE_ID, version);
        self
    }

    /// Adds a project under `Projects/<name>`.
    pub fn with_project(self, name: &str, version: Option<&str>) -> Self {
        write_project(&self.project(name), version);
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn install_root(&self) -> PathBuf {
        self.path().join("Editors")
    }

    pub fn project(&self, name: &str) -> PathBuf {
        self.path().join("Projects").join(name)
    }

    pub fn state_path(&self) -> PathBuf {
        self.path().join("state").join("HubData.json")
    }

    pub fn store(&self) -> Store {
        Store::new(self.state_path())
    }

    /// A default state pointed at this fixture's directories.
    pub fn state(&self) -> HubState {
        let mut state = HubState::default();
        state.settings.install_location = self.install_root();
        state.settings.project_location = self.path().join("Projects");
        state.settings.hub_location = self.path().join("Unity Hub.app");
        state
    }

    /// Writes `state` to the state file.
    pub fn save_state(&self, state: &HubState) {
        self.store().save(state).expect("Failed to write state");
    }

    /// Reads the state file back.
    pub fn read_state(&self) -> serde_json::Value {
        let data = fs::read(self.state_path()).expect("Failed to read state");
        serde_json::from_slice(&data).expect("State is not JSON")
    }

    /// Installs a fake hub executable that "downloads" by creating the
    /// editor directory and printing the success phrase.
    #[cfg(unix)]
    pub fn with_fake_hub(self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let macos = self.path().join("Unity Hub.app").join("Contents").join("MacOS");
        fs::create_dir_all(&macos).expect("Failed to create hub bundle");
        let script = macos.join("Unity Hub");
        let install_root = self.install_root();
        let body = format!(
            r#"#!/bin/sh
version=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--version" ]; then version="$2"; fi
  shift
done
bundle="{root}/$version/Unity.app/Contents"
mkdir -p "$bundle"
cat > "$bundle/Info.plist" <<PLIST
<?xml version="1.0" encoding="UTF-8"?>
<plist version="1.0"><dict><key>CFBundleIdentifier</key><string>{id}</string></dict></plist>
PLIST
echo "Editor $version successfully downloaded"
"#,
            root = install_root.display(),
            id = EDITOR_BUNDLE_ID,
        );
        fs::write(&script, body).expect("Failed to write fake hub");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("Failed to mark fake hub executable");
        self
    }

    /// The binary under test, pointed at this fixture's state file.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("editor-hub");
        cmd.env("EDITOR_HUB_STATE", self.state_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--color")
            .arg("never");
        cmd
    }
}

impl Default for HubFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A `CommandRunner` whose `run` blocks until the test supplies the output.
///
/// Each call to `run` waits for one message from the paired
/// `mpsc::Sender<String>`; dropping the sender makes pending runs fail.
pub struct ScriptedRunner {
    outputs: Mutex<mpsc::Receiver<String>>,
    calls: Mutex<Vec<CommandLine>>,
    launched: Mutex<Vec<CommandLine>>,
    started: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new() -> (Self, mpsc::Sender<String>) {
        let (tx, rx) = mpsc::channel();
        let runner = Self {
            outputs: Mutex::new(rx),
            calls: Mutex::new(Vec::new()),
            launched: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
        };
        (runner, tx)
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().unwrap().clone()
    }

    pub fn launched(&self) -> Vec<CommandLine> {
        self.launched.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Polls until `count` runs have started.
    pub async fn wait_for_started(&self, count: usize) {
        for _ in 0..500 {
            if self.started() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("runner never reached {count} started runs");
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &CommandLine, check: &SuccessCheck) -> Result<ExternalCommandResult> {
        self.calls.lock().unwrap().push(command.clone());
        self.started.fetch_add(1, Ordering::SeqCst);

        let received = self
            .outputs
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(30));
        match received {
            Ok(raw_output) => Ok(ExternalCommandResult {
                succeeded: check.evaluate(true, &raw_output),
                raw_output,
            }),
            Err(e) => Err(Error::CommandLaunch {
                command: command.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn spawn_detached(&self, command: &CommandLine) -> Result<()> {
        self.launched.lock().unwrap().push(command.clone());
        Ok(())
    }
}
