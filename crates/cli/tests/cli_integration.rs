//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `proteus-migrate` binary and verify
//! exit codes, stdout content, and filesystem effects. Every test runs
//! inside its own temp directory so no settings file leaks in.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const V1_SOURCE: &str = "import ProteusJS from 'proteusjs';\nconst p = new ProteusJS();\n";

fn migrate_cmd(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("proteus-migrate");
    cmd.current_dir(dir);
    cmd
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(
        root.join("package.json"),
        r#"{ "dependencies": { "proteusjs": "1.2.0" } }"#,
    )
    .unwrap();
    fs::write(root.join("src/app.js"), V1_SOURCE).unwrap();
    fs::write(root.join("src/plain.js"), "export {};\n").unwrap();
    temp_dir
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    migrate_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Detect and migrate ProteusJS usage"));
}

#[test]
fn list_shows_every_transform() {
    let dir = TempDir::new().unwrap();
    migrate_cmd(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("package-imports"))
        .stdout(predicate::str::contains("performance-api"));
}

// ──────────────────────────────────────────────
// 2. Detect
// ──────────────────────────────────────────────

#[test]
fn detect_reports_version_and_next_step() {
    let project = project();
    migrate_cmd(project.path())
        .arg("detect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Declared dependency: proteusjs 1.2.0"))
        .stdout(predicate::str::contains("Files using ProteusJS: 1"))
        .stdout(predicate::str::contains("Next step: proteus-migrate migrate"));
}

#[test]
fn detect_json_output() {
    let project = project();
    let output = migrate_cmd(project.path())
        .args(["detect", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["hasUsage"], true);
    assert_eq!(value["declaredVersion"], "1.2.0");
}

#[test]
fn detect_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    migrate_cmd(dir.path())
        .args(["detect", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

// ──────────────────────────────────────────────
// 3. Migrate
// ──────────────────────────────────────────────

#[test]
fn migrate_rewrites_backs_up_and_reports() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 file(s) transformed, 0 with errors"));

    let app = fs::read_to_string(root.join("src/app.js")).unwrap();
    assert!(app.contains("@sc4rfurryx/proteusjs"));
    assert_eq!(fs::read_to_string(root.join("src/app.js.backup")).unwrap(), V1_SOURCE);

    let report = fs::read_to_string(root.join("src/MIGRATION_REPORT.md")).unwrap();
    assert!(report.contains("- Success rate: 50.0%"));
}

#[test]
fn migrate_dry_run_changes_nothing() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 file(s) would be transformed"));

    assert_eq!(fs::read_to_string(root.join("src/app.js")).unwrap(), V1_SOURCE);
    assert!(!root.join("src/app.js.backup").exists());
    assert!(!root.join("src/MIGRATION_REPORT.md").exists());
}

#[test]
fn migrate_no_backup() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src", "--yes", "--no-backup", "--transforms", "package-imports"])
        .assert()
        .success();

    let app = fs::read_to_string(root.join("src/app.js")).unwrap();
    assert!(app.contains("@sc4rfurryx/proteusjs"));
    assert!(app.contains("new ProteusJS()"));
    assert!(!root.join("src/app.js.backup").exists());
}

#[test]
fn migrate_unknown_transform_exits_1_without_touching_files() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src", "--yes", "--transforms", "package-imports,bogus"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown transform(s): bogus"));

    assert_eq!(fs::read_to_string(root.join("src/app.js")).unwrap(), V1_SOURCE);
    assert!(!root.join("src/MIGRATION_REPORT.md").exists());
}

#[test]
fn migrate_missing_source_exits_1() {
    let dir = TempDir::new().unwrap();
    migrate_cmd(dir.path())
        .args(["migrate", "nope", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

#[test]
fn migrate_declined_confirmation_changes_nothing() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration cancelled."));

    assert_eq!(fs::read_to_string(root.join("src/app.js")).unwrap(), V1_SOURCE);
}

// ──────────────────────────────────────────────
// 4. Init
// ──────────────────────────────────────────────

#[test]
fn init_then_migrate_uses_settings() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["init", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("proteus-migrate.json"));

    let settings = fs::read_to_string(root.join("proteus-migrate.json")).unwrap();
    assert!(settings.contains("\"sourceDirectory\": \"src\""));

    // No SOURCE argument: the settings file supplies it
    migrate_cmd(root)
        .args(["migrate", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 file(s) transformed"));
}

#[test]
fn init_interactive_answers() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .arg("init")
        .write_stdin("app\ninstance-init\n\nn\nn\n")
        .assert()
        .success();

    let settings = fs::read_to_string(root.join("proteus-migrate.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&settings).unwrap();
    assert_eq!(value["sourceDirectory"], "app");
    assert_eq!(value["transforms"], serde_json::json!(["instance-init"]));
    assert_eq!(value["backup"], false);
}

#[test]
fn migrate_without_source_or_settings_fails() {
    let dir = TempDir::new().unwrap();
    migrate_cmd(dir.path())
        .args(["migrate", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no source directory given"));
}

#[test]
fn migrate_reads_settings_from_source_when_run_elsewhere() {
    let outside = TempDir::new().unwrap();
    let project = project();
    let src = project.path().join("src");
    fs::write(src.join("proteus-migrate.json"), r#"{ "backup": false }"#).unwrap();

    migrate_cmd(outside.path())
        .arg("migrate")
        .arg(&src)
        .arg("--yes")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 2 file(s) transformed"));

    assert!(!src.join("app.js.backup").exists());
    assert!(!outside.path().join("MIGRATION_REPORT.md").exists());
}

#[test]
fn migrate_reads_settings_from_project_root_of_source() {
    let outside = TempDir::new().unwrap();
    let project = project();
    let root = project.path();
    fs::write(
        root.join("proteus-migrate.json"),
        r#"{ "transforms": ["instance-init"] }"#,
    )
    .unwrap();

    migrate_cmd(outside.path())
        .arg("migrate")
        .arg(root.join("src"))
        .args(["--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transforms: instance-init\n"));
}

#[test]
fn verbose_setting_shows_progress() {
    let project = project();
    let root = project.path();

    migrate_cmd(root)
        .args(["migrate", "src", "--dry-run"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("[1/2]").not());

    fs::write(root.join("proteus-migrate.json"), r#"{ "verbose": true }"#).unwrap();

    migrate_cmd(root)
        .args(["migrate", "--dry-run"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("[1/2]"))
        .stderr(predicate::str::contains("[2/2]"));
}
