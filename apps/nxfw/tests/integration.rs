//! Integration tests for nxfw CLI

use std::process::Command;

fn nxfw() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_nxfw"));
    command
        .env_remove("RUST_LOG")
        .env("NXFW_COLOR", "never");
    command
}

const GLOBAL: [&str; 8] = [
    "--keys",
    "prod.keys",
    "--cert",
    "missing.p12",
    "--device-id",
    "6265ca8e4fe6b5a3",
    "--environment-id",
    "lp1",
];

#[test]
fn test_cli_version() {
    let output = nxfw()
        .arg("--version")
        .output()
        .expect("Failed to execute nxfw");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nxfw"));
}

#[test]
fn test_cli_help() {
    let output = nxfw()
        .arg("--help")
        .output()
        .expect("Failed to execute nxfw");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("check"));
    assert!(stdout.contains("download"));
    assert!(stdout.contains("--environment-id"));
}

#[test]
fn test_cli_invalid_command() {
    let output = nxfw()
        .args(GLOBAL)
        .arg("invalid-command")
        .output()
        .expect("Failed to execute nxfw");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_missing_version_source() {
    let output = nxfw()
        .args(GLOBAL)
        .arg("check")
        .output()
        .expect("Failed to execute nxfw");

    assert!(!output.status.success());
}

#[test]
fn test_bad_version_file_fails_before_network() {
    let temp = tempfile::tempdir().unwrap();
    let version_file = temp.path().join("version");
    std::fs::write(&version_file, "not a number").unwrap();

    let output = nxfw()
        .args(GLOBAL)
        .args(["check", "--version-file"])
        .arg(&version_file)
        .output()
        .expect("Failed to execute nxfw");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not hold a decimal version"));
}

#[test]
fn test_unreadable_certificate() {
    let output = nxfw()
        .args(GLOBAL)
        .args(["check", "--current-version", "100"])
        .output()
        .expect("Failed to execute nxfw");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.p12"));
}
