//! Integration tests for railgen-cli.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn railgen(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("railgen").unwrap();
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("RAILGEN_CONFIG");
    cmd
}

#[test]
fn test_help_flag() {
    let temp = TempDir::new().unwrap();
    railgen(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rails + React + GraphQL"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("rollback"));
}

#[test]
fn test_version_flag() {
    let temp = TempDir::new().unwrap();
    railgen(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_generate_help_lists_feature_flags() {
    let temp = TempDir::new().unwrap();
    railgen(temp.path())
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--rails-version"))
        .stdout(predicate::str::contains("--no-docker"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_generate_with_defaults() {
    let temp = TempDir::new().unwrap();

    railgen(temp.path())
        .args(["generate", "shop", "--yes", "--no-git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("project is ready"))
        .stdout(predicate::str::contains("cd shop"))
        .stdout(predicate::str::contains("http://localhost:3000/graphiql"));

    let project = temp.path().join("shop");
    assert!(project.join("backend/Gemfile").is_file());
    assert!(project.join("frontend/package.json").is_file());
    assert!(project.join("docker-compose.yml").is_file());
    assert!(!project.join(".git").exists());

    let gemfile = fs::read_to_string(project.join("backend/Gemfile")).unwrap();
    assert!(!gemfile.contains("{{"), "unsubstituted placeholder in Gemfile");

    // Nothing was there before, so no snapshot is left behind.
    assert!(!temp.path().join(".railgen-backup").exists());
}

#[test]
fn test_generate_alias_without_docker() {
    let temp = TempDir::new().unwrap();

    railgen(temp.path())
        .args(["g", "api", "--yes", "--no-git", "--no-docker", "--database", "sqlite"])
        .assert()
        .success();

    let project = temp.path().join("api");
    assert!(project.join("backend").is_dir());
    assert!(!project.join("docker-compose.yml").exists());
}

#[test]
fn test_generate_over_existing_directory_discards_snapshot() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("shop");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("notes.txt"), "keep me").unwrap();

    railgen(temp.path())
        .args(["generate", "shop", "--yes", "--no-git"])
        .assert()
        .success();

    assert!(project.join("backend/Gemfile").is_file());
    let backups = temp.path().join(".railgen-backup");
    let leftover = fs::read_dir(&backups).map(|d| d.count()).unwrap_or(0);
    assert_eq!(leftover, 0, "snapshot should be removed after success");
}

#[test]
fn test_generate_json_output() {
    let temp = TempDir::new().unwrap();

    let out = railgen(temp.path())
        .args(["--output-format", "json", "generate", "shop", "--yes", "--no-git"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(summary["files"].as_u64().unwrap() > 0);
    assert_eq!(summary["git_initialized"], false);
}

#[test]
fn test_quiet_generate_prints_nothing() {
    let temp = TempDir::new().unwrap();

    railgen(temp.path())
        .args(["-q", "generate", "shop", "--yes", "--no-git"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_rollback_without_path_is_a_no_op() {
    let temp = TempDir::new().unwrap();

    railgen(temp.path())
        .arg("rollback")
        .assert()
        .success()
        .stdout(predicate::str::contains("No rollback information available"));
}

#[test]
fn test_rollback_without_snapshots() {
    let temp = TempDir::new().unwrap();

    railgen(temp.path())
        .args(["rollback", "--project-path", "shop", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn test_rollback_restores_latest_snapshot() {
    let temp = TempDir::new().unwrap();
    let backups = temp.path().join(".railgen-backup");
    let older = backups.join("backup-2024-05-01T10-00-00-000Z");
    let newer = backups.join("backup-2024-05-02T10-00-00-000Z");
    fs::create_dir_all(&older).unwrap();
    fs::create_dir_all(newer.join("config")).unwrap();
    fs::write(older.join("old.txt"), "old").unwrap();
    fs::write(newer.join("config/app.yml"), "restored").unwrap();

    let project = temp.path().join("shop");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("half-written.rb"), "junk").unwrap();

    railgen(temp.path())
        .args(["rollback", "--project-path", "shop", "--latest", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled back"));

    assert_eq!(
        fs::read_to_string(project.join("config/app.yml")).unwrap(),
        "restored"
    );
    assert!(!project.join("half-written.rb").exists());
    assert!(!project.join("old.txt").exists());
    assert!(!newer.exists(), "restored snapshot should be removed");
    assert!(older.exists());
}

#[test]
fn test_rollback_named_snapshot() {
    let temp = TempDir::new().unwrap();
    let older = temp
        .path()
        .join(".railgen-backup/backup-2024-05-01T10-00-00-000Z");
    fs::create_dir_all(&older).unwrap();
    fs::write(older.join("old.txt"), "old").unwrap();
    fs::create_dir_all(
        temp.path()
            .join(".railgen-backup/backup-2024-05-02T10-00-00-000Z"),
    )
    .unwrap();

    railgen(temp.path())
        .args([
            "rollback",
            "--project-path",
            "shop",
            "--snapshot",
            "backup-2024-05-01T10-00-00-000Z",
            "--yes",
        ])
        .assert()
        .success();

    assert!(temp.path().join("shop/old.txt").is_file());
}

#[test]
fn test_config_get_default() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("railgen.toml");
    fs::write(&config, "").unwrap();

    railgen(temp.path())
        .args(["--config", config.to_str().unwrap(), "config", "get", "defaults.database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("postgresql"));
}

#[test]
fn test_config_file_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("railgen.toml");
    fs::write(&config, "[defaults]\ndatabase = \"sqlite\"\n").unwrap();

    railgen(temp.path())
        .args(["-c", config.to_str().unwrap(), "config", "get", "defaults.database"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlite"));
}

#[test]
fn test_env_overrides_config() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("railgen.toml");
    fs::write(&config, "").unwrap();

    railgen(temp.path())
        .env("RAILGEN_DEFAULTS__BUILD_TOOL", "webpack")
        .args(["-c", config.to_str().unwrap(), "config", "get", "defaults.build_tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("webpack"));
}

#[test]
fn test_config_path() {
    let temp = TempDir::new().unwrap();
    railgen(temp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toml"));
}

#[test]
fn test_completions_bash() {
    let temp = TempDir::new().unwrap();
    railgen(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("railgen"));
}
