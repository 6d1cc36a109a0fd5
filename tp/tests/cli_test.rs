//! CLI tests for the `tp` binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `tp` isolated from the user's home, config and log directories
fn tp(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tp").expect("tp binary should build");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_handlers_lists_builtin_names() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .arg("handlers")
        .assert()
        .success()
        .stdout(predicate::str::contains("backup_database"))
        .stdout(predicate::str::contains("health_check"));
}

#[test]
fn test_config_prints_defaults() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker-count: 3"))
        .stdout(predicate::str::contains("task-count: 200"));
}

#[test]
fn test_config_reads_explicit_file() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.yml");
    fs::write(&path, "scheduler:\n  worker-count: 7\ndemo:\n  task-count: 3\n").unwrap();

    tp(&home)
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("worker-count: 7"))
        .stdout(predicate::str::contains("task-count: 3"));
}

#[test]
fn test_config_picks_up_project_file() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".taskpool.yml"), "scheduler:\n  max-retries: 9\n").unwrap();

    tp(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max-retries: 9"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["--config", "does-not-exist.yml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_run_json_output() {
    let home = TempDir::new().unwrap();
    let output = tp(&home)
        .args([
            "run",
            "--tasks",
            "5",
            "--workers",
            "2",
            "--duration",
            "1",
            "--time-scale",
            "0.01",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stats = &json["stats"];
    assert_eq!(stats["total_submitted"], 5);
    assert_eq!(stats["worker_count"], 0);
    assert_eq!(stats["running"], 0);
    let completed = stats["completed_count"].as_u64().unwrap();
    let queued = stats["queued"].as_u64().unwrap();
    assert_eq!(completed + queued, 5);
    assert_eq!(json["drained"], true);

    // Logs go to a file, never to stdout
    assert!(home.path().join(".local/share/taskpool/logs/taskpool.log").exists());
}

#[test]
fn test_run_text_output() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["run", "-t", "3", "-w", "1", "-d", "1", "--time-scale", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scheduler completed:"));
}

#[test]
fn test_run_rejects_bad_failure_rate() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["run", "--failure-rate", "2.0", "-d", "0"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_log_level_fails() {
    let home = TempDir::new().unwrap();
    tp(&home)
        .args(["--log-level", "loud", "handlers"])
        .assert()
        .failure();
}

#[test]
fn test_log_file_written_for_every_command() {
    let home = TempDir::new().unwrap();
    tp(&home).args(["--log-level", "debug", "handlers"]).assert().success();

    let log = home.path().join(".local/share/taskpool/logs/taskpool.log");
    let content = fs::read_to_string(&log).unwrap();
    assert!(content.contains("Logging initialized"));
    assert!(content.contains("taskpool.log"));
}
