//! CLI integration tests

use std::process::Command;

fn lpp(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "laptop-price-cli", "--"])
        .args(args)
        .env_remove("LPP_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = lpp(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Laptop Price Predictor"),
        "Should show app name"
    );
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("schema"), "Should show schema command");
    assert!(stdout.contains("normalize"), "Should show normalize command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = lpp(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("lpp"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let output = lpp(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--interactive"), "Should show interactive flag");
    assert!(stdout.contains("--company"), "Should show company flag");
    assert!(stdout.contains("--flash-storage"), "Should show storage flags");
}

/// Test normalize subcommand help
#[test]
fn test_normalize_help() {
    let output = lpp(&["normalize", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("FIELD"), "Should show field argument");
    assert!(stdout.contains("VALUE"), "Should show value argument");
}

/// Test normalizing a messy value with JSON output
#[test]
fn test_normalize_json_output() {
    let output = lpp(&["normalize", "ram", "16gb", "--format", "json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("\"result\": \"16\""), "Should show coerced value");
    assert!(stdout.contains("\"corrected\""), "Should flag the correction");
}

/// Test that an unknown field name is refused
#[test]
fn test_normalize_unknown_field() {
    let output = lpp(&["normalize", "battery", "5h"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown field"), "Should name the problem");
}
