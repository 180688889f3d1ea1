//! Shared test helpers for `hed_toolchain_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::{Arc, LazyLock};

use hed_toolchain_core::Diagnostic;
use hed_toolchain_schema::loader::load_schema_from_path;
use hed_toolchain_schema::{Schema, Schemas};
use indexmap::IndexMap;

/// The HED 8.3.0 subset fixture, loaded once per test binary.
pub static SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../schemas/HED8.3.0-subset.jsonc");
    let schema = load_schema_from_path(&path)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", path.display(), e));
    Arc::new(schema)
});

/// The fixture as the base schema.
pub static SCHEMAS: LazyLock<Schemas> =
    LazyLock::new(|| Schemas::new(IndexMap::from([(String::new(), Arc::clone(&SCHEMA))])));

/// The fixture as the base schema and again under the `sc` prefix.
#[allow(dead_code)]
pub static LIBRARY_SCHEMAS: LazyLock<Schemas> = LazyLock::new(|| {
    Schemas::new(IndexMap::from([
        (String::new(), Arc::clone(&SCHEMA)),
        ("sc".to_string(), Arc::clone(&SCHEMA)),
    ]))
});

/// Find first diagnostic with the given code.
#[allow(dead_code)]
pub fn find_diag<'a>(issues: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    issues
        .iter()
        .find(|d| &*d.id == code)
        .unwrap_or_else(|| panic!("expected diagnostic {code} in {issues:#?}"))
}

/// Issue ids in order.
#[allow(dead_code)]
pub fn diag_codes(issues: &[Diagnostic]) -> Vec<String> {
    issues.iter().map(|d| d.id.to_string()).collect()
}

/// Syntax issue ids of a string, empty when it tokenizes.
#[allow(dead_code)]
pub fn syntax_codes(input: &str) -> Vec<String> {
    match hed_toolchain_core::tokenize(input) {
        Ok(_) => Vec::new(),
        Err(issues) => diag_codes(&issues),
    }
}
