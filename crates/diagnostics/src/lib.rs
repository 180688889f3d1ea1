//! Diagnostics for the HED toolchain.
//!
//! Provides [`Diagnostic`], [`Severity`] and [`Span`], the types used to
//! report problems found while tokenizing and resolving HED strings. Issue
//! ids are defined in the [`codes`] module; each id also maps to an official
//! HED error code through [`hed_code_for`].

#![warn(missing_docs)]

/// Issue id constants auto-generated from the issue catalogue.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Range;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Severity {
    /// Hard error: the HED string is invalid.
    Error,
    /// Warning: the HED string is accepted but suspicious.
    Warn,
    /// Informational note.
    Info,
}

/// Byte span in a HED string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The span as a `Range`, for slicing.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A diagnostic produced by the tokenizer or the tag resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Issue id (e.g., `"emptyTagFound"`).
    pub id: Cow<'static, str>,
    /// Severity level.
    pub severity: Severity,
    /// Human-readable diagnostic message.
    pub message: String,
    /// Byte span in the HED string that this diagnostic relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context (`index`, `tag`, `parentTag`, ...).
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic with the given fields.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        severity: Severity,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            message: message.into(),
            span,
            context: None,
        }
    }

    /// Shorthand for an `Error` diagnostic.
    pub fn error(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Error, message, span)
    }

    /// Shorthand for a `Warn` diagnostic.
    pub fn warn(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Warn, message, span)
    }

    /// Shorthand for an `Info` diagnostic.
    pub fn info(
        id: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self::new(id, Severity::Info, message, span)
    }

    /// Attach machine-readable context metadata (builder pattern).
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.as_ref()?.get(key).map(String::as_str)
    }

    /// Returns the human-readable explanation for this diagnostic's id, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }

    /// The official HED error code for this diagnostic's id (e.g. `TAG_INVALID`).
    pub fn hed_code(&self) -> Option<&'static str> {
        hed_code_for(&self.id)
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warn => write!(f, "warn"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.id, self.message)
    }
}

/// Returns the human-readable explanation for an issue id, if known.
///
/// Auto-generated from `spec/diagnostics.jsonc` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the official HED error code an issue id reports as.
pub fn hed_code_for(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_hed_codes.rs"))
}

/// Returns `"syntax"` or `"conversion"` for a known issue id.
pub fn category_for_code(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_categories.rs"))
}

/// Returns the default severity of an issue id.
pub fn severity_for_code(id: &str) -> Option<Severity> {
    include!(concat!(env!("OUT_DIR"), "/generated_severity.rs"))
}

/// Returns the message template for an issue id and variant (`"default"`, ...).
pub fn message_template_for(id: &str, variant: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}
