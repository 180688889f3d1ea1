//! Shared test helpers for `hed_toolchain_schema` integration tests.

#![allow(unreachable_pub)]

use std::path::PathBuf;
use std::sync::LazyLock;

use hed_toolchain_schema::loader::load_schema_from_path;
use hed_toolchain_schema::{Schema, SchemaEntries};

/// Path of the bundled HED 8.3.0 subset schema.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../schemas/HED8.3.0-subset.jsonc")
}

/// Fixture schema loaded once per test binary.
pub static SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let path = fixture_path();
    load_schema_from_path(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e))
});

/// Entry model of the fixture schema.
pub fn entries() -> &'static SchemaEntries {
    SCHEMA
        .entries()
        .unwrap_or_else(|| panic!("fixture schema is not HED-3"))
}
