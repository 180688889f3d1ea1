use serde::Serialize;

use hed_toolchain_schema::Schemas;

use crate::issues::ParsingIssues;

use super::column_splice::ParsedHedColumnSplice;
use super::group::{
    ParsedHedGroup, ParsedHedSubstring, collect_column_splices, collect_tags, format_nodes,
};
use super::parsed_tag::ParsedHedTag;
use super::splitter::split_hed_string;

/// A parsed HED string: its tree and the issues found.
///
/// With syntax issues the tree is empty.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedHedString {
    hed_string: String,
    tree: Vec<ParsedHedSubstring>,
    issues: ParsingIssues,
}

/// Parse a HED string against a schema collection.
pub fn parse_hed_string(hed_string: &str, schemas: &Schemas) -> ParsedHedString {
    let split = split_hed_string(hed_string, schemas);
    ParsedHedString {
        hed_string: hed_string.to_string(),
        tree: split.tree.unwrap_or_default(),
        issues: split.issues,
    }
}

impl ParsedHedString {
    /// The string as given.
    pub fn hed_string(&self) -> &str {
        &self.hed_string
    }

    /// Top-level nodes.
    pub fn tree(&self) -> &[ParsedHedSubstring] {
        &self.tree
    }

    /// Issues by stage.
    pub fn issues(&self) -> &ParsingIssues {
        &self.issues
    }

    /// Whether parsing found no issue.
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Every tag, depth-first.
    pub fn tags(&self) -> Vec<&ParsedHedTag> {
        let mut tags = Vec::new();
        collect_tags(&self.tree, &mut tags);
        tags
    }

    /// Tags outside any group.
    pub fn top_level_tags(&self) -> impl Iterator<Item = &ParsedHedTag> {
        self.tree.iter().filter_map(ParsedHedSubstring::as_tag)
    }

    /// Top-level groups.
    pub fn tag_groups(&self) -> impl Iterator<Item = &ParsedHedGroup> {
        self.tree.iter().filter_map(ParsedHedSubstring::as_group)
    }

    /// Every column splice, depth-first.
    pub fn column_splices(&self) -> Vec<&ParsedHedColumnSplice> {
        let mut splices = Vec::new();
        collect_column_splices(&self.tree, &mut splices);
        splices
    }

    /// The string rebuilt in long or short form.
    pub fn format(&self, long: bool) -> String {
        format_nodes(&self.tree, long)
    }
}
