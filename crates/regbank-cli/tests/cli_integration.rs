//! Integration tests for the regbank CLI.

use env_logger as _;
use log as _;
use regbank_cli as _;
use regbank_core as _;
use serde as _;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("regbank")
}

fn regbank(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .output()
        .expect("failed to run regbank")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn show_lists_layer_a() {
    let output = regbank(&["show", "--device", "layer-a"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 3);
    assert!(text.contains("0x0003  reg 3"));
}

#[test]
fn show_row_renders_the_editor() {
    let output = regbank(&["show", "--device", "layer-a", "--row", "1"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Register: reg 2\nAddress: 0x0002\n"));
    assert!(text.contains("slider 0 in 0..=255"));
}

#[test]
fn selftest_passes_on_builtin_devices() {
    for device in ["layer-a", "layer-b"] {
        let output = regbank(&["selftest", "--device", device, "--seed", "7"]);
        assert!(output.status.success(), "{device}: {}", stderr(&output));
        assert!(stdout(&output).starts_with("Self-test passed:"));
    }
}

#[test]
fn export_then_edit_a_json_device() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("bank.json");
    let file_arg = file.to_str().unwrap();

    let output = regbank(&["export", file_arg, "--device", "layer-b"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).starts_with("Exported 2 registers"));

    let output = regbank(&["set", "1", "0xA5", "--device", file_arg]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Value: 165 (0xa5, 0b10100101)"));

    let output = regbank(&["set-field", "0", "bit 0", "1", "--device", file_arg]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("bit 0      [0+1]  HIGH"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["registers"][0]["value"]["value"], 0x80);
    assert_eq!(json["registers"][1]["value"]["value"], 0xA5);
}

#[test]
fn out_of_range_values_fail_with_an_error() {
    let output = regbank(&["set", "0", "256", "--device", "layer-a"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("error: value 256 is outside 0..=255"));
}

#[test]
fn malformed_json_devices_are_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = temp_dir.path().join("broken.json");
    fs::write(
        &file,
        r#"{"version": 1, "registers": [{"name": 42, "address": 1, "bitfields": [], "value": {"value": 0, "width": 8}}]}"#,
    )
    .unwrap();

    let output = regbank(&["show", "--device", file.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("register 0: register name is not text"));
}

#[test]
fn partitions_lists_every_composition() {
    let output = regbank(&["partitions", "--width", "4"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.ends_with("8 partitions\n"));
    assert!(text.lines().any(|line| line == "1 3"));
}

#[test]
fn unknown_command_prints_usage() {
    let output = regbank(&["frobnicate"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("unknown command: frobnicate"));
    assert!(err.contains("Usage: regbank"));
}
