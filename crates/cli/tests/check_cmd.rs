mod common;

use std::fs;

use common::{fixture_schema, hed_cmd, run_json};

#[test]
fn valid_string_passes() {
    let schema = fixture_schema();
    let (output, json) = run_json(&["check", "Event, (Train/Maglev, Age/15)", "--schema", &schema]);
    assert!(output.status.success());
    assert_eq!(json["success"], true);
    assert_eq!(json["strings"][0]["line"], 1);
    assert_eq!(json["strings"][0]["source"], "<string>");
    assert!(json["strings"][0]["issues"]["syntax"].as_array().unwrap().is_empty());
    assert!(json["strings"][0]["issues"]["conversion"].as_array().unwrap().is_empty());
}

#[test]
fn syntax_issues_fail_the_check() {
    let schema = fixture_schema();
    let (output, json) = run_json(&["check", "Event,,Red", "--schema", &schema]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["success"], false);
    let issue = &json["strings"][0]["issues"]["syntax"][0];
    assert_eq!(issue["id"], "emptyTagFound");
    assert_eq!(issue["span"]["start"], 6);
}

#[test]
fn conversion_issues_fail_the_check() {
    let schema = fixture_schema();
    let (output, json) = run_json(&["check", "Event, Junk", "--schema", &schema]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(json["strings"][0]["issues"]["conversion"][0]["id"], "invalidTag");
}

#[test]
fn syntax_only_skips_resolution() {
    let (output, json) = run_json(&["check", "Junk/Stuff, (Whatever)", "--syntax-only"]);
    assert!(output.status.success());
    assert_eq!(json["success"], true);
}

#[test]
fn schema_from_environment() {
    let output = hed_cmd()
        .env("HED_SCHEMA", fixture_schema())
        .args(["check", "Junk", "--output", "json"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn file_lines_are_checked_separately() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("strings.txt");
    fs::write(&path, "Event, Red\n\n(Age/abc)\nOperate\n").expect("write strings");
    let path = path.to_string_lossy().to_string();

    let schema = fixture_schema();
    let (output, json) = run_json(&["check", "--file", &path, "--schema", &schema]);
    assert_eq!(output.status.code(), Some(1));
    let strings = json["strings"].as_array().unwrap();
    let lines: Vec<u64> = strings.iter().map(|s| s["line"].as_u64().unwrap()).collect();
    assert_eq!(lines, [1, 3, 4]);
    assert_eq!(strings[1]["hedString"], "(Age/abc)");
    assert_eq!(strings[1]["issues"]["conversion"][0]["id"], "invalidValue");
    assert!(strings[2]["issues"]["conversion"].as_array().unwrap().is_empty());
}

#[test]
fn pretty_output_underlines_issues() {
    let schema = fixture_schema();
    let output = hed_cmd()
        .args(["check", "Event, Junk", "--schema", &schema, "--output", "pretty"])
        .output()
        .expect("run check");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalidTag"), "stderr: {stderr}");
    assert!(stderr.contains("1 error"), "stderr: {stderr}");
}
