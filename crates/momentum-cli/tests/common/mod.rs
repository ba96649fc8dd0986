//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

/// Invoke the CLI with `home` as its data directory.
pub fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_momentum"))
        .args(args)
        .env("MOMENTUM_HOME", home)
        .env_remove("MOMENTUM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

/// Invoke a CLI command and expect failure.
pub fn run_cli_failure(home: &Path, args: &[&str]) -> String {
    let (_, stderr, code) = run_cli(home, args);
    assert_ne!(code, 0, "CLI command unexpectedly succeeded: {args:?}");
    stderr
}

/// Parse JSON output from CLI.
pub fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// Create a task and return its id.
pub fn add_task(home: &Path, title: &str, deadline: &str, achievement: u8, resistance: u8) -> String {
    let out = run_cli_success(
        home,
        &[
            "task",
            "add",
            title,
            "--deadline",
            deadline,
            "--achievement",
            &achievement.to_string(),
            "--resistance",
            &resistance.to_string(),
        ],
    );
    out.lines()
        .next()
        .and_then(|l| l.strip_prefix("Task created: "))
        .expect("missing task id")
        .to_string()
}
