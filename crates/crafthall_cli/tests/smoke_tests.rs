//! CLI smoke tests — verify basic binary behavior.

use std::process::Command;

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_crafthall"))
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
    assert!(stdout.contains("--config"));
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("crafthall"),
        "Expected binary name in --version output"
    );
}

#[test]
fn test_missing_onebot_config_fails_cleanly() {
    let dir = std::env::temp_dir();
    let output = cli_bin()
        .arg("--config")
        .arg("/tmp/nonexistent_crafthall_config_12345.toml")
        .arg("--db")
        .arg(dir.join("crafthall_smoke_unused.db"))
        .env_remove("ONEBOT_WS_URL")
        .env_remove("ONEBOT_ACCESS_TOKEN")
        .current_dir(&dir)
        .output()
        .expect("failed to run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No OneBot connection configured"), "stderr: {stderr}");
}
