#![allow(unreachable_pub, dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};

use assert_cmd::cargo;

pub fn hed_cmd() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("hed"));
    cmd.env_remove("HED_SCHEMA").env_remove("RUST_LOG");
    cmd
}

pub fn fixture_schema() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../schemas/HED8.3.0-subset.jsonc")
        .to_string_lossy()
        .to_string()
}

/// Run with `--output json` and parse stdout.
pub fn run_json(args: &[&str]) -> (Output, serde_json::Value) {
    let output = hed_cmd()
        .args(args)
        .args(["--output", "json"])
        .output()
        .expect("run hed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json = serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
    (output, json)
}
