use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or building a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("failed to read schema file '{}': {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON deserialization failed.
    #[error("invalid schema JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The `version` field is not a dotted version number.
    #[error("invalid schema version '{0}'")]
    InvalidVersion(String),

    /// Two tags share a short name.
    #[error("duplicate tag '{name}' (already defined as '{existing}')")]
    DuplicateTag {
        /// The repeated short name.
        name: String,
        /// Long name of the tag that claimed the name first.
        existing: String,
    },

    /// Two entries of the same kind share a name.
    #[error("duplicate {kind} '{name}'")]
    DuplicateEntry {
        /// Entry kind (`"unit class"`, `"attribute"`, ...).
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A tag names a unit class the schema does not define.
    #[error("tag '{tag}' references unknown unit class '{unit_class}'")]
    UnknownUnitClass {
        /// Long name of the referencing tag.
        tag: String,
        /// The missing unit class.
        unit_class: String,
    },

    /// A tag names a value class the schema does not define.
    #[error("tag '{tag}' references unknown value class '{value_class}'")]
    UnknownValueClass {
        /// Long name of the referencing tag.
        tag: String,
        /// The missing value class.
        value_class: String,
    },

    /// A value class produced a regular expression that does not compile.
    #[error("invalid pattern for value class '{name}': {source}")]
    InvalidValueClassPattern {
        /// Value class name.
        name: String,
        /// Regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// The schema graph violates a structural invariant (a second value
    /// tag under one parent, a value tag with children, ...).
    #[error("schema internal consistency error: {0}")]
    InternalConsistency(String),

    /// No schema file could be located for a spec.
    #[error("no schema file found for '{name}' (searched {searched} location(s))")]
    NotFound {
        /// Local name of the requested schema (`HED8.3.0`, `HED_score_1.0.0`).
        name: String,
        /// Number of candidate paths that were tried.
        searched: usize,
    },

    /// Loading a schema failed and so did its configured fallback.
    #[error("failed to load schema '{name}': {source}; fallback '{}' also failed: {fallback_error}", fallback.display())]
    Load {
        /// Local name of the requested schema.
        name: String,
        /// The original failure.
        #[source]
        source: Box<SchemaError>,
        /// Fallback path that was tried.
        fallback: PathBuf,
        /// Failure of the fallback.
        fallback_error: Box<SchemaError>,
    },

    /// Two schema specs in one collection use the same nickname.
    #[error("duplicate schema nickname '{0}'")]
    DuplicateNickname(String),

    /// A version spec such as `sc:score_1.0.0` could not be parsed.
    #[error("invalid schema version spec '{0}'")]
    InvalidSpec(String),
}
