//! End-to-end tests for the `editor-hub` binary.
//!
//! These tests invoke the binary directly against a temporary state file and
//! install root and check its output.

#[allow(dead_code)]
mod common;
use common::prelude::*;

use std::fs;

fn seeded() -> HubFixture {
    let fixture = HubFixture::new();
    fixture.save_state(&fixture.state());
    fixture
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("editor-hub");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("installs"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_completions_bash() {
    let mut cmd = cargo_bin_cmd!("editor-hub");
    cmd.arg("completions")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("_editor-hub()"))
        .stdout(predicate::str::contains("installs"));
}

#[test]
fn test_completions_rejects_unknown_shell() {
    let mut cmd = cargo_bin_cmd!("editor-hub");
    cmd.arg("completions").arg("tcsh").assert().failure();
}

#[test]
fn test_installs_lists_scanned_editors() {
    let fixture = seeded().with_editor("2021.3.5f1").with_editor("2022.2.0b3");

    fixture
        .command()
        .arg("installs")
        .assert()
        .success()
        .stdout(predicate::str::contains("2022.2.0b3"))
        .stdout(predicate::str::contains("2021.3.5f1 (LTS)"));

    let saved = fixture.read_state();
    assert_eq!(saved["versions"].as_array().unwrap().len(), 2);
}

#[test]
fn test_installs_json() {
    let fixture = seeded().with_editor("2021.3.5f1");

    let output = fixture
        .command()
        .args(["installs", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["version"], "2021.3.5f1");
    assert_eq!(rows[0]["lts"], true);
}

#[test]
fn test_missing_state_file_is_created() {
    let fixture = HubFixture::new();
    fixture
        .command()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("install-location"));
    assert!(fixture.state_path().exists());
}

#[test]
fn test_malformed_state_file_is_replaced() {
    let fixture = HubFixture::new();
    fs::create_dir_all(fixture.state_path().parent().unwrap()).unwrap();
    fs::write(fixture.state_path(), "{ not json").unwrap();

    fixture.command().args(["settings", "show"]).assert().success();
    assert!(fixture.read_state()["uuid"].is_string());
    assert!(fixture.state_path().with_extension("json.bak").exists());
}

#[test]
fn test_settings_set_flag_and_timeout() {
    let fixture = seeded();
    fixture
        .command()
        .args(["settings", "set", "show-filesize", "true"])
        .assert()
        .success();
    fixture
        .command()
        .args(["settings", "set", "timeout", "600"])
        .assert()
        .success();

    let saved = fixture.read_state();
    assert_eq!(saved["showFileSize"], true);
    assert_eq!(saved["operationTimeoutSecs"], 600);
}

#[test]
fn test_settings_rejects_unknown_key() {
    let fixture = seeded();
    fixture
        .command()
        .args(["settings", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
}

#[test]
fn test_invalid_version_argument() {
    let fixture = seeded();
    fixture
        .command()
        .args(["install", "latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid editor version"));
}

#[test]
fn test_uninstall_unknown_version_fails() {
    let fixture = seeded();
    fixture
        .command()
        .args(["uninstall", "2021.3.5f1", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_uninstall_removes_directory() {
    let fixture = seeded().with_editor("2021.3.5f1");
    fixture.command().arg("installs").assert().success();

    fixture
        .command()
        .args(["uninstall", "2021.3.5f1", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uninstalled 2021.3.5f1"));
    assert!(!fixture.install_root().join("2021.3.5f1").exists());
}

#[test]
fn test_projects_add_pin_and_list() {
    let fixture = seeded().with_project("Game", Some("2021.3.5f1"));
    let project = fixture.project("Game");

    fixture
        .command()
        .args(["projects", "add"])
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Game (2021.3.5f1)"));
    fixture
        .command()
        .args(["projects", "pin"])
        .arg(&project)
        .assert()
        .success();
    fixture
        .command()
        .args(["projects", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Game"))
        .stdout(predicate::str::contains("not installed"));

    assert_eq!(fixture.read_state()["projects"][0]["pinned"], true);
}

#[test]
fn test_projects_add_rejects_plain_directory() {
    let fixture = seeded();
    let plain = fixture.path().join("Plain");
    fs::create_dir_all(&plain).unwrap();

    fixture
        .command()
        .args(["projects", "add"])
        .arg(&plain)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid project"));
}

#[test]
fn test_open_without_installation_fails() {
    let fixture = seeded().with_project("Game", Some("2021.3.5f1"));
    let project = fixture.project("Game");
    fixture
        .command()
        .args(["projects", "add"])
        .arg(&project)
        .assert()
        .success();

    fixture
        .command()
        .arg("open")
        .arg(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_locate_rejects_directory_without_bundle() {
    let fixture = seeded();
    let elsewhere = fixture.path().join("Elsewhere");
    fs::create_dir_all(&elsewhere).unwrap();

    fixture
        .command()
        .arg("locate")
        .arg(&elsewhere)
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not contain Unity.app"));
}

#[test]
fn test_locate_adds_external_editor() {
    let fixture = seeded();
    let external = fixture.path().join("External").join("2020.3.1f1");
    write_editor(&external, EDITOR_BUNDLE_ID, "2020.3.1f1");

    fixture
        .command()
        .arg("locate")
        .arg(&external)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2020.3.1f1"));

    let saved = fixture.read_state();
    assert_eq!(
        saved["customInstallLocations"][0],
        external.display().to_string()
    );
}

#[cfg(unix)]
#[test]
fn test_install_with_fake_hub() {
    let fixture = seeded().with_fake_hub();

    fixture
        .command()
        .args(["install", "2022.3.1f1", "-m", "android"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed 2022.3.1f1"));

    let saved = fixture.read_state();
    assert_eq!(saved["versions"][0]["version"], "2022.3.1f1");
    assert_eq!(saved["versions"][0]["installing"], false);
    assert!(fixture
        .install_root()
        .join("2022.3.1f1/Unity.app/Contents/Info.plist")
        .exists());
}

#[cfg(unix)]
#[test]
fn test_install_failure_exits_nonzero() {
    // No hub executable at the configured location.
    let fixture = seeded();

    fixture
        .command()
        .args(["install", "2022.3.1f1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Operation failed"));
    assert_eq!(fixture.read_state()["versions"], serde_json::json!([]));
}
