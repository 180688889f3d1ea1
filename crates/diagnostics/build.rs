//! Build script for generating issue code data structures at compile time.
//!
//! This script reads `spec/diagnostics.jsonc` and generates Rust files:
//! - `generated_codes.rs`: public constants mapping constant names to issue ids
//! - `generated_explain.rs`: issue id → long description
//! - `generated_hed_codes.rs`: issue id → official HED error code
//! - `generated_categories.rs`: issue id → category (`syntax` / `conversion`)
//! - `generated_severity.rs`: issue id → default severity
//! - `generated_templates.rs`: (issue id, variant) → message template

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use hed_toolchain_jsonc_strip::strip_jsonc;

const CATEGORIES: &[&str] = &["syntax", "conversion"];

fn main() {
    let spec_path = Path::new("spec/diagnostics.jsonc");
    println!("cargo:rerun-if-changed={}", spec_path.display());

    let raw = fs::read_to_string(spec_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", spec_path.display()));

    let stripped = strip_jsonc(&raw);

    let spec: serde_json::Value =
        serde_json::from_str(&stripped).expect("failed to parse diagnostics.jsonc as JSON");

    let diagnostics = spec["diagnostics"]
        .as_array()
        .expect("diagnostics.jsonc: expected `diagnostics` array");

    let out_dir = env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir);

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    // ── generated_codes.rs ──────────────────────────────────────────────
    let mut codes =
        String::from("// Auto-generated from spec/diagnostics.jsonc. DO NOT EDIT.\n\n");

    for (i, entry) in diagnostics.iter().enumerate() {
        let id = entry["id"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] missing `id`"));
        let const_name = entry["constName"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] (id={id}) missing `constName`"));
        let summary = entry["summary"]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] (id={id}) missing `summary`"));

        assert!(
            !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric()),
            "diagnostics[{i}]: id '{id}' must be a non-empty camelCase identifier"
        );
        assert!(
            !const_name.is_empty()
                && const_name
                    .bytes()
                    .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
                && const_name.as_bytes()[0].is_ascii_uppercase(),
            "diagnostics[{i}] (id={id}): constName '{const_name}' is not a valid SCREAMING_SNAKE_CASE identifier"
        );
        assert!(
            seen_ids.insert(id.to_string()),
            "diagnostics[{i}]: duplicate id '{id}'"
        );
        assert!(
            seen_names.insert(const_name.to_string()),
            "diagnostics[{i}] (id={id}): duplicate constName '{const_name}'"
        );

        codes.push_str(&format!("/// {summary}\n"));
        codes.push_str(&format!("pub const {const_name}: &str = \"{id}\";\n\n"));
    }

    codes.push_str("/// Every issue id in the catalogue, in declaration order.\n");
    codes.push_str("pub const ALL: &[&str] = &[\n");
    for entry in diagnostics {
        let const_name = entry["constName"].as_str().unwrap();
        codes.push_str(&format!("    {const_name},\n"));
    }
    codes.push_str("];\n");

    fs::write(out_path.join("generated_codes.rs"), &codes)
        .expect("failed to write generated_codes.rs");

    // ── generated_explain.rs ────────────────────────────────────────────
    let explain = lookup_table(diagnostics, "description", |value| {
        format!("Some(\"{}\")", escape_rust_string_literal(value))
    });
    fs::write(out_path.join("generated_explain.rs"), &explain)
        .expect("failed to write generated_explain.rs");

    // ── generated_hed_codes.rs ──────────────────────────────────────────
    let hed_codes = lookup_table(diagnostics, "hedCode", |value| {
        assert!(
            value
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_'),
            "hedCode '{value}' must be SCREAMING_SNAKE_CASE"
        );
        format!("Some(\"{value}\")")
    });
    fs::write(out_path.join("generated_hed_codes.rs"), &hed_codes)
        .expect("failed to write generated_hed_codes.rs");

    // ── generated_categories.rs ─────────────────────────────────────────
    let categories = lookup_table(diagnostics, "category", |value| {
        assert!(
            CATEGORIES.contains(&value),
            "category '{value}' must be one of {CATEGORIES:?}"
        );
        format!("Some(\"{value}\")")
    });
    fs::write(out_path.join("generated_categories.rs"), &categories)
        .expect("failed to write generated_categories.rs");

    // ── generated_severity.rs ───────────────────────────────────────────
    let severity = lookup_table(diagnostics, "severity", |value| {
        let sev_rs = match value {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            "info" => "Severity::Info",
            other => panic!("invalid severity '{other}'"),
        };
        format!("Some({sev_rs})")
    });
    fs::write(out_path.join("generated_severity.rs"), &severity)
        .expect("failed to write generated_severity.rs");

    // ── generated_templates.rs ──────────────────────────────────────────
    let mut templates =
        String::from("// Auto-generated from spec/diagnostics.jsonc. DO NOT EDIT.\n\n");
    templates.push_str("match (id, variant) {\n");
    for (i, entry) in diagnostics.iter().enumerate() {
        let id = entry["id"].as_str().unwrap();
        let context_keys: HashSet<String> = entry["contextKeys"]
            .as_array()
            .unwrap_or_else(|| panic!("diagnostics[{i}] (id={id}) missing `contextKeys`"))
            .iter()
            .map(|k| {
                k.as_str().unwrap_or_else(|| {
                    panic!("diagnostics[{i}] (id={id}) contextKeys entries must be strings")
                })
            })
            .map(str::to_string)
            .collect();
        let map = entry["messageTemplates"]
            .as_object()
            .unwrap_or_else(|| panic!("diagnostics[{i}] (id={id}) missing `messageTemplates`"));
        assert!(
            map.contains_key("default"),
            "diagnostics[{i}] (id={id}) messageTemplates must define `default`"
        );
        for (variant, template) in map {
            let template = template.as_str().unwrap_or_else(|| {
                panic!("diagnostics[{i}] (id={id}) messageTemplates.{variant} must be a string")
            });
            for placeholder in extract_template_placeholders(template) {
                assert!(
                    context_keys.contains(&placeholder),
                    "diagnostics[{i}] (id={id}) messageTemplates.{variant} references placeholder '{{{placeholder}}}' not listed in contextKeys"
                );
            }
            let escaped = escape_rust_string_literal(template);
            templates.push_str(&format!(
                "    (\"{id}\", \"{variant}\") => Some(\"{escaped}\"),\n"
            ));
        }
    }
    templates.push_str("    _ => None,\n}\n");
    fs::write(out_path.join("generated_templates.rs"), &templates)
        .expect("failed to write generated_templates.rs");
}

/// Build a `match id { .. }` expression over one string field of every entry.
fn lookup_table(
    diagnostics: &[serde_json::Value],
    field: &str,
    arm: impl Fn(&str) -> String,
) -> String {
    let mut out = String::from("match id {\n");
    for (i, entry) in diagnostics.iter().enumerate() {
        let id = entry["id"].as_str().unwrap();
        let value = entry[field]
            .as_str()
            .unwrap_or_else(|| panic!("diagnostics[{i}] (id={id}) missing `{field}`"));
        out.push_str(&format!("    \"{id}\" => {},\n", arm(value)));
    }
    out.push_str("    _ => None,\n}\n");
    out
}

fn escape_rust_string_literal(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}

fn extract_template_placeholders(template: &str) -> HashSet<String> {
    let mut placeholders = HashSet::new();
    let mut scan_from = 0usize;
    while let Some(open_rel) = template[scan_from..].find('{') {
        let open = scan_from + open_rel;
        let after_open = open + 1;
        if let Some(close_rel) = template[after_open..].find('}') {
            let close = after_open + close_rel;
            let key = template[after_open..close].trim();
            if !key.is_empty() {
                placeholders.insert(key.to_string());
            }
            scan_from = close + 1;
        } else {
            break;
        }
    }
    placeholders
}
