//! HED toolchain core library.
//!
//! Tokenizes HED annotation strings, resolves their tags against a loaded
//! schema collection and builds the parse tree. The main entry points are
//! [`tokenize`] for syntax only, [`split_hed_string`] for the tree plus
//! issues, and [`parse_hed_string`] for a [`ParsedHedString`].

#![warn(missing_docs)]

/// Build a context map for a diagnostic: `ctx!("tag" => tag, "index" => i)`.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// HED string grammar: tokenizer and token tree.
pub mod grammar;
/// Issue construction and grouping.
pub mod issues;
/// Tag resolution and the parsed tree.
pub mod parser;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Tokenizer
pub use grammar::spec::{ColumnSpliceSpec, GroupSpec, SubstringSpec, TagSpec, TokenItem};
pub use grammar::tokenizer::{HedStringTokenizer, tokenize};

// Parser
pub use parser::column_splice::ParsedHedColumnSplice;
pub use parser::converter::{ConvertedTag, TagConverter};
pub use parser::group::{ParsedHedGroup, ParsedHedSubstring};
pub use parser::parsed_string::{ParsedHedString, parse_hed_string};
pub use parser::parsed_tag::ParsedHedTag;
pub use parser::splitter::{HedStringSplitter, SplitResult, split_hed_string};

// Issues
pub use issues::ParsingIssues;

// Diagnostics (re-exported from the diagnostics crate)
pub use grammar::diag::{Diagnostic, Severity, Span, codes};
