//! CLI integration tests
//!
//! These run the compiled binary and only cover paths that fail before any
//! gcloud invocation, so they need neither gcloud nor credentials.

use std::path::Path;
use std::process::{Command, Output};

fn gcp_inventory(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcp-inventory"))
        .args(args)
        .current_dir(cwd)
        .env_clear()
        .envs(env.iter().copied())
        .output()
        .expect("binary should run")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    let output = gcp_inventory(dir.path(), &["--help"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("deploy"));
    assert!(stdout.contains("inventory"));
}

#[test]
fn test_deploy_rejects_invalid_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "ProjectId: my-project\nTargetBucket: b\nJobRegion: us-central1\nSchedule: '* * * *'\n",
    )
    .unwrap();

    let output = gcp_inventory(
        dir.path(),
        &["--log-level", "off", "deploy", "--path", path.to_str().unwrap()],
        &[],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid schedule"), "{}", stderr(&output));
}

#[test]
fn test_deploy_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = gcp_inventory(
        dir.path(),
        &["--log-level", "off", "deploy", "--path", "does-not-exist.yaml"],
        &[],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("failed to read config file"));
}

#[test]
fn test_inventory_rejects_invalid_schedule_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let output = gcp_inventory(
        dir.path(),
        &["--log-level", "off", "inventory"],
        &[("PROJECT_ID", "my-project"), ("SCHEDULE", "every hour")],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("invalid schedule"));
}

#[test]
fn test_inventory_requires_project() {
    let dir = tempfile::tempdir().unwrap();
    let output = gcp_inventory(
        dir.path(),
        &["--log-level", "off", "inventory", "--staging-dir", "stage"],
        &[("TARGET_BUCKET", "b")],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing required setting: ProjectId"));
    assert!(!dir.path().join("stage").exists());
}

#[test]
fn test_log_file_receives_errors() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("logs").join("gcp-inventory.log");

    let output = gcp_inventory(
        dir.path(),
        &["--log-file", log.to_str().unwrap(), "inventory"],
        &[("TARGET_BUCKET", "b")],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("missing required setting: ProjectId"));
    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("missing required setting: ProjectId"));
}
