//! Tokenizer output to parse tree.
//!
//! Syntax issues stop the split: the tree is `None`. Tags that fail to
//! resolve are left out of the tree and reported as conversion issues,
//! while the rest of the string is still built.

use hed_toolchain_schema::Schemas;
use log::debug;
use serde::Serialize;

use crate::grammar::diag::Diagnostic;
use crate::grammar::spec::{SubstringSpec, TokenItem};
use crate::grammar::tokenizer::tokenize;
use crate::issues::ParsingIssues;

use super::column_splice::ParsedHedColumnSplice;
use super::group::{ParsedHedGroup, ParsedHedSubstring};
use super::parsed_tag::ParsedHedTag;

/// Parse tree of a HED string with the issues found while building it.
#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    /// Top-level nodes; `None` when the string has syntax issues.
    pub tree: Option<Vec<ParsedHedSubstring>>,
    /// Issues by stage.
    pub issues: ParsingIssues,
}

/// Builds the parse tree of one HED string against a schema collection.
#[derive(Debug)]
pub struct HedStringSplitter<'a> {
    hed_string: &'a str,
    schemas: &'a Schemas,
    conversion: Vec<Diagnostic>,
}

impl<'a> HedStringSplitter<'a> {
    /// Splitter for `hed_string`.
    pub fn new(hed_string: &'a str, schemas: &'a Schemas) -> Self {
        Self {
            hed_string,
            schemas,
            conversion: Vec::new(),
        }
    }

    /// Tokenize and resolve every tag.
    pub fn split(mut self) -> SplitResult {
        let root = match tokenize(self.hed_string) {
            Ok(root) => root,
            Err(syntax) => {
                debug!(
                    "{} syntax issue(s) in {:?}, no tree built",
                    syntax.len(),
                    self.hed_string
                );
                return SplitResult {
                    tree: None,
                    issues: ParsingIssues {
                        syntax,
                        conversion: Vec::new(),
                    },
                };
            }
        };
        let tree = self.build(&root.items);
        debug!(
            "split {:?} into {} top-level node(s), {} conversion issue(s)",
            self.hed_string,
            tree.len(),
            self.conversion.len()
        );
        SplitResult {
            tree: Some(tree),
            issues: ParsingIssues {
                syntax: Vec::new(),
                conversion: self.conversion,
            },
        }
    }

    fn build(&mut self, items: &[TokenItem]) -> Vec<ParsedHedSubstring> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                TokenItem::Tag(spec) => match ParsedHedTag::new(spec, self.schemas) {
                    Ok(tag) => nodes.push(ParsedHedSubstring::Tag(tag)),
                    Err(issue) => self.conversion.push(issue),
                },
                TokenItem::ColumnSplice(spec) => {
                    nodes.push(ParsedHedSubstring::ColumnSplice(ParsedHedColumnSplice::new(
                        spec,
                    )));
                }
                TokenItem::Group(spec) => {
                    let children = self.build(&spec.items);
                    let text = spec.text(self.hed_string).to_string();
                    nodes.push(ParsedHedSubstring::Group(ParsedHedGroup::new(
                        children, spec.span, text,
                    )));
                }
            }
        }
        nodes
    }
}

/// Split a HED string into its parse tree.
pub fn split_hed_string(hed_string: &str, schemas: &Schemas) -> SplitResult {
    HedStringSplitter::new(hed_string, schemas).split()
}
