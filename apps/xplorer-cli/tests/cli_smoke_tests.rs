#![allow(clippy::unwrap_used, clippy::expect_used)]

//! CLI smoke tests for the xplorer-cli binary
//!
//! None of these reach the network: they cover help output, configuration
//! layering and argument validation.

use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_cli(args: &[&str], env: &[(&str, &str)]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_xplorer-cli"));
    cmd.args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("Failed to execute xplorer-cli")
}

#[test]
fn test_cli_help_lists_commands() {
    let output = run_cli(&["--help"], &[]);

    assert!(output.status.success(), "Help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    for command in ["stats", "nodes", "node", "history"] {
        assert!(stdout.contains(command), "Should list '{command}'");
    }
}

#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"], &[]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_print_config_defaults() {
    let output = run_cli(&["--print-config"], &[]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_saphyr::from_str(&stdout).expect("valid YAML");
    assert_eq!(parsed["api_base_url"], "https://xandeum-api.onrender.com");
    assert_eq!(parsed["page_size"], 50);
    assert_eq!(parsed["enrichment"]["lookup_delay"], "1s 200ms");
}

#[test]
fn test_cli_print_config_layers_file_env_and_flags() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("xplorer.yaml");
    std::fs::write(
        &config_path,
        "api_base_url: \"http://file:1\"\npage_size: 10\ngeo_base_url: \"http://geo-file\"\n",
    )
    .unwrap();

    let output = run_cli(
        &[
            "--config",
            config_path.to_str().unwrap(),
            "--api-url",
            "http://flag:3",
            "--print-config",
        ],
        &[("XPLORER_PAGE_SIZE", "25"), ("XPLORER_API_BASE_URL", "http://env:2")],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_saphyr::from_str(&stdout).unwrap();
    assert_eq!(parsed["api_base_url"], "http://flag:3");
    assert_eq!(parsed["page_size"], 25);
    assert_eq!(parsed["geo_base_url"], "http://geo-file");
}

#[test]
fn test_cli_rejects_missing_config_file() {
    let output = run_cli(&["--config", "/definitely/not/here.yaml", "stats"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file does not exist"));
}

#[test]
fn test_cli_rejects_invalid_page_size() {
    let output = run_cli(&["--page-size", "0", "--print-config"], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("page_size"));
}

#[test]
fn test_cli_requires_a_command() {
    let output = run_cli(&[], &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no command given"));
}
