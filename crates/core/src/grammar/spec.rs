use serde::Serialize;

use super::diag::Span;

/// A piece of a HED string located by its byte span.
pub trait SubstringSpec {
    /// Byte span in the tokenized string.
    fn span(&self) -> Span;

    /// The covered text.
    ///
    /// # Panics
    ///
    /// Panics if `hed_string` is not the string that was tokenized.
    fn text<'s>(&self, hed_string: &'s str) -> &'s str {
        &hed_string[self.span().range()]
    }
}

/// A tag as written: trimmed text, span, and schema prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSpec {
    /// Trimmed tag text, without the library prefix.
    pub tag: String,
    /// Span of the trimmed tag text.
    pub span: Span,
    /// Library prefix (`sc` in `sc:Tag`); empty when absent.
    pub library: String,
}

/// A `{column}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpliceSpec {
    /// Trimmed column name.
    pub column_name: String,
    /// Span covering both braces.
    pub span: Span,
}

/// A parenthesized group, or the whole string at the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSpec {
    /// Span including the parentheses. The root spans the whole string.
    pub span: Span,
    /// Items in left-to-right order.
    pub items: Vec<TokenItem>,
}

/// One item of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TokenItem {
    /// A tag.
    Tag(TagSpec),
    /// A column splice.
    ColumnSplice(ColumnSpliceSpec),
    /// A nested group.
    Group(GroupSpec),
}

impl SubstringSpec for TagSpec {
    fn span(&self) -> Span {
        self.span
    }
}

impl SubstringSpec for ColumnSpliceSpec {
    fn span(&self) -> Span {
        self.span
    }
}

impl SubstringSpec for GroupSpec {
    fn span(&self) -> Span {
        self.span
    }
}

impl SubstringSpec for TokenItem {
    fn span(&self) -> Span {
        match self {
            TokenItem::Tag(tag) => tag.span,
            TokenItem::ColumnSplice(splice) => splice.span,
            TokenItem::Group(group) => group.span,
        }
    }
}

impl GroupSpec {
    /// Direct subgroups.
    pub fn children(&self) -> impl Iterator<Item = &GroupSpec> {
        self.items.iter().filter_map(|item| match item {
            TokenItem::Group(group) => Some(group),
            _ => None,
        })
    }

    /// Direct tags.
    pub fn tags(&self) -> impl Iterator<Item = &TagSpec> {
        self.items.iter().filter_map(|item| match item {
            TokenItem::Tag(tag) => Some(tag),
            _ => None,
        })
    }

    /// Every tag in the tree, depth-first, left to right.
    pub fn all_tags(&self) -> Vec<&TagSpec> {
        let mut tags = Vec::new();
        self.collect_tags(&mut tags);
        tags
    }

    fn collect_tags<'a>(&'a self, out: &mut Vec<&'a TagSpec>) {
        for item in &self.items {
            match item {
                TokenItem::Tag(tag) => out.push(tag),
                TokenItem::Group(group) => group.collect_tags(out),
                TokenItem::ColumnSplice(_) => {}
            }
        }
    }

    /// Every column splice in the tree, depth-first, left to right.
    pub fn all_column_splices(&self) -> Vec<&ColumnSpliceSpec> {
        let mut splices = Vec::new();
        self.collect_splices(&mut splices);
        splices
    }

    fn collect_splices<'a>(&'a self, out: &mut Vec<&'a ColumnSpliceSpec>) {
        for item in &self.items {
            match item {
                TokenItem::ColumnSplice(splice) => out.push(splice),
                TokenItem::Group(group) => group.collect_splices(out),
                TokenItem::Tag(_) => {}
            }
        }
    }
}
