//! End-to-end tests running the sensitctl binary
//!
//! Each test runs in its own temporary working directory so that settings
//! files never leak between tests.

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn sensitctl(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sensitctl"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("SENSITCTL_FORMAT")
        .env_remove("SENSITCTL_DEFAULT_PROTOCOL")
        .env_remove("SENSITCTL_COLOR")
        .env_remove("SENSITCTL_CONFIG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_decode_json() {
    let dir = TempDir::new().unwrap();
    let output = sensitctl(dir.path(), &["decode", "f609744f", "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["reading"]["version"], 3);
    assert_eq!(value["reading"]["mode"], "temperature");
    assert_eq!(value["reading"]["fields"]["temperature"], 172);
}

#[test]
fn test_decode_rejects_bad_length() {
    let dir = TempDir::new().unwrap();
    let output = sensitctl(dir.path(), &["decode", "f61000"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid uplink length"), "stderr: {}", stderr);
}

#[test]
fn test_config_decode_uses_settings_protocol() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sensitctl.toml"), "default_protocol = 2\nformat = \"json\"\n").unwrap();

    let output = sensitctl(dir.path(), &["config", "decode", "00ff008f04027390"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["protocol"], 2);
    assert_eq!(value["temperature_high"], 107);
}

#[test]
fn test_environment_overrides_settings_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("sensitctl.toml"), "default_protocol = 2\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_sensitctl"))
        .args(["config", "decode", "46003f0f8004023c", "--format", "json"])
        .current_dir(dir.path())
        .env("SENSITCTL_DEFAULT_PROTOCOL", "3")
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["protocol"], 3);
    assert_eq!(value["humidity_high"], 90);
}

#[test]
fn test_config_encode_yaml_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("device.yaml");
    fs::write(
        &file,
        r#"
limited: true
period: one_hour
periodic:
  temperature: true
  light: true
temperature_low: -9
temperature_high: 54
humidity_low: 30
humidity_high: 90
brightness_threshold: 1
vibration: standard
vibration_clear_delay: end_of_vibration_message
door: standard
"#,
    )
    .unwrap();

    let output = sensitctl(dir.path(), &["config", "encode", "device.yaml", "--protocol", "3"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output).trim(), "46003F0F8004023C");
}

#[test]
fn test_config_encode_reports_field_errors() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("device.json");
    fs::write(
        &file,
        r#"{
            "limited": true,
            "period": "one_hour",
            "temperature_low": -30,
            "temperature_high": 107,
            "brightness_low": 0,
            "brightness_high": 960,
            "vibration": "standard",
            "door": "sensitive"
        }"#,
    )
    .unwrap();

    let output = sensitctl(dir.path(), &["config", "encode", "device.json", "-p", "2"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("temperature_low"), "stderr: {}", stderr);
}
