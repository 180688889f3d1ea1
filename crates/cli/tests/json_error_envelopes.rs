//! Ensure CLI command failures honor `--output json`.

mod common;

use common::{fixture_schema, run_json};

fn assert_envelope(json: &serde_json::Value, needle: &str) {
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "command_failed");
    assert!(
        json["message"].as_str().is_some_and(|m| m.contains(needle)),
        "unexpected message: {}",
        json["message"]
    );
}

#[test]
fn missing_input_file_emits_json_error_envelope() {
    let (output, json) = run_json(&["check", "--file", "nope-does-not-exist.tsv"]);
    assert!(!output.status.success());
    assert_envelope(&json, "failed to read");
}

#[test]
fn missing_schema_file_emits_json_error_envelope() {
    let (output, json) = run_json(&["check", "Event", "--schema", "missing-schema.json"]);
    assert!(!output.status.success());
    assert_envelope(&json, "failed to load schemas");
}

#[test]
fn malformed_library_flag_emits_json_error_envelope() {
    let schema = fixture_schema();
    let (output, json) = run_json(&["check", "sc:Event", "--library", &schema]);
    assert!(!output.status.success());
    assert_envelope(&json, "expected NICK=PATH");
}

#[test]
fn duplicate_base_schema_emits_json_error_envelope() {
    let schema = fixture_schema();
    let (output, json) = run_json(&[
        "check",
        "Event",
        "--schema",
        &schema,
        "--hed-version",
        "8.3.0",
    ]);
    assert!(!output.status.success());
    assert_eq!(json["error"], "command_failed");
}

#[test]
fn missing_string_emits_json_error_envelope() {
    let (output, json) = run_json(&["parse"]);
    assert!(!output.status.success());
    assert_envelope(&json, "no HED string given");
}
