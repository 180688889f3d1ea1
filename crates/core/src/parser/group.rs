use std::fmt;

use serde::Serialize;

use crate::grammar::diag::Span;

use super::column_splice::ParsedHedColumnSplice;
use super::parsed_tag::ParsedHedTag;

/// A node of the parse tree.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ParsedHedSubstring {
    /// A tag.
    Tag(ParsedHedTag),
    /// A parenthesized group.
    Group(ParsedHedGroup),
    /// A `{column}` placeholder.
    ColumnSplice(ParsedHedColumnSplice),
}

impl ParsedHedSubstring {
    /// Span in the HED string.
    pub fn span(&self) -> Span {
        match self {
            ParsedHedSubstring::Tag(tag) => tag.span(),
            ParsedHedSubstring::Group(group) => group.span(),
            ParsedHedSubstring::ColumnSplice(splice) => splice.span(),
        }
    }

    /// Long or short form of the node.
    pub fn format(&self, long: bool) -> String {
        match self {
            ParsedHedSubstring::Tag(tag) => tag.format(long),
            ParsedHedSubstring::Group(group) => group.format(long),
            ParsedHedSubstring::ColumnSplice(splice) => splice.format(),
        }
    }

    /// The tag, if this node is one.
    pub fn as_tag(&self) -> Option<&ParsedHedTag> {
        match self {
            ParsedHedSubstring::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// The group, if this node is one.
    pub fn as_group(&self) -> Option<&ParsedHedGroup> {
        match self {
            ParsedHedSubstring::Group(group) => Some(group),
            _ => None,
        }
    }

    /// The column splice, if this node is one.
    pub fn as_column_splice(&self) -> Option<&ParsedHedColumnSplice> {
        match self {
            ParsedHedSubstring::ColumnSplice(splice) => Some(splice),
            _ => None,
        }
    }
}

impl fmt::Display for ParsedHedSubstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedHedSubstring::Tag(tag) => fmt::Display::fmt(tag, f),
            ParsedHedSubstring::Group(group) => fmt::Display::fmt(group, f),
            ParsedHedSubstring::ColumnSplice(splice) => fmt::Display::fmt(splice, f),
        }
    }
}

/// A parenthesized group of tags, splices and nested groups.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedHedGroup {
    children: Vec<ParsedHedSubstring>,
    span: Span,
    original_text: String,
}

impl ParsedHedGroup {
    /// Group with its parsed children and the text it was parsed from.
    pub fn new(children: Vec<ParsedHedSubstring>, span: Span, original_text: String) -> Self {
        Self {
            children,
            span,
            original_text,
        }
    }

    /// Children in order. Tags that failed to resolve are absent.
    pub fn children(&self) -> &[ParsedHedSubstring] {
        &self.children
    }

    /// Span including the parentheses.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The group as written, parentheses included.
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Direct tags.
    pub fn tags(&self) -> impl Iterator<Item = &ParsedHedTag> {
        self.children.iter().filter_map(ParsedHedSubstring::as_tag)
    }

    /// Direct subgroups.
    pub fn subgroups(&self) -> impl Iterator<Item = &ParsedHedGroup> {
        self.children.iter().filter_map(ParsedHedSubstring::as_group)
    }

    /// Direct column splices.
    pub fn column_splices(&self) -> impl Iterator<Item = &ParsedHedColumnSplice> {
        self.children
            .iter()
            .filter_map(ParsedHedSubstring::as_column_splice)
    }

    /// Every tag in the group, depth-first.
    pub fn all_tags(&self) -> Vec<&ParsedHedTag> {
        let mut tags = Vec::new();
        collect_tags(&self.children, &mut tags);
        tags
    }

    /// `(a, b, (c))` in long or short form.
    pub fn format(&self, long: bool) -> String {
        format!("({})", format_nodes(&self.children, long))
    }
}

impl fmt::Display for ParsedHedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original_text)
    }
}

/// Depth-first tags of a node list.
pub(crate) fn collect_tags<'a>(nodes: &'a [ParsedHedSubstring], out: &mut Vec<&'a ParsedHedTag>) {
    for node in nodes {
        match node {
            ParsedHedSubstring::Tag(tag) => out.push(tag),
            ParsedHedSubstring::Group(group) => collect_tags(&group.children, out),
            ParsedHedSubstring::ColumnSplice(_) => {}
        }
    }
}

/// Depth-first column splices of a node list.
pub(crate) fn collect_column_splices<'a>(
    nodes: &'a [ParsedHedSubstring],
    out: &mut Vec<&'a ParsedHedColumnSplice>,
) {
    for node in nodes {
        match node {
            ParsedHedSubstring::ColumnSplice(splice) => out.push(splice),
            ParsedHedSubstring::Group(group) => collect_column_splices(&group.children, out),
            ParsedHedSubstring::Tag(_) => {}
        }
    }
}

pub(crate) fn format_nodes(nodes: &[ParsedHedSubstring], long: bool) -> String {
    nodes
        .iter()
        .map(|node| node.format(long))
        .collect::<Vec<_>>()
        .join(", ")
}
