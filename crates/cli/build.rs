//! Build script for the HED CLI binary.
//!
//! Embeds a default schema into the binary so that `hed check` and the other
//! commands work without `--schema`.
//!
//! Schema resolution order:
//!   1. `../../schemas/HED8.3.0-subset.jsonc` (workspace copy, used during development)
//!   2. `data/schema.jsonc` (in-crate copy, used from a crates.io tarball)
//!
//! If neither exists the binary is built without a schema; commands then
//! need `--schema`, `--hed-version` or `HED_SCHEMA`, or fall back to syntax
//! checks only.

use std::path::Path;

fn main() {
    // Declare the custom cfg so cargo check-cfg doesn't warn.
    println!("cargo::rustc-check-cfg=cfg(has_embedded_schema)");

    let workspace = Path::new("../../schemas/HED8.3.0-subset.jsonc");
    let in_crate = Path::new("data/schema.jsonc");

    println!("cargo:rerun-if-changed=../../schemas/HED8.3.0-subset.jsonc");
    println!("cargo:rerun-if-changed=data/schema.jsonc");

    let schema_path = if workspace.exists() {
        workspace
    } else if in_crate.exists() {
        in_crate
    } else {
        return;
    };

    println!("cargo:rustc-cfg=has_embedded_schema");

    // Copy into OUT_DIR so include_str! has a stable, absolute path.
    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest = Path::new(&out_dir).join("schema.jsonc");
    std::fs::copy(schema_path, &dest).expect("failed to copy the default schema to OUT_DIR");
}
