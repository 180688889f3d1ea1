//! Character-level tokenizer for HED strings.
//!
//! A HED string is a comma-separated list of tags, parenthesized groups and
//! `{column}` splices. Tags are slash-separated paths that may carry a
//! library prefix (`sc:Tag`). The tokenizer stops at the first problem it
//! finds and reports it with the byte index where it was detected.

use std::collections::BTreeMap;

use log::{debug, trace};

use super::characters::{character_name, is_invalid_character};
use super::diag::{Diagnostic, Span, codes};
use super::spec::{ColumnSpliceSpec, GroupSpec, TagSpec, TokenItem};
use crate::issues::issue;

/// Tokenize a HED string into its token tree.
///
/// On success the root [`GroupSpec`] spans the whole string. On failure the
/// issues found up to the first failing character are returned.
pub fn tokenize(hed_string: &str) -> Result<GroupSpec, Vec<Diagnostic>> {
    HedStringTokenizer::new(hed_string).tokenize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    OpeningGroup,
    ClosingGroup,
    OpeningColumn,
    ClosingColumn,
    Comma,
}

#[derive(Debug)]
struct GroupFrame {
    start: usize,
    items: Vec<TokenItem>,
}

/// Single-use tokenizer state for one HED string.
#[derive(Debug)]
pub struct HedStringTokenizer<'a> {
    hed_string: &'a str,
    issues: Vec<Diagnostic>,
    current_token: String,
    // Byte index where `current_token` starts in `hed_string`.
    starting_index: usize,
    last_delimiter: Option<(Delimiter, usize)>,
    library: String,
    last_slash: Option<usize>,
    // groups[0] is the root; the rest are open parentheses.
    groups: Vec<GroupFrame>,
}

impl<'a> HedStringTokenizer<'a> {
    /// Prepare to tokenize `hed_string`.
    pub fn new(hed_string: &'a str) -> Self {
        Self {
            hed_string,
            issues: Vec::new(),
            current_token: String::new(),
            starting_index: 0,
            last_delimiter: None,
            library: String::new(),
            last_slash: None,
            groups: vec![GroupFrame {
                start: 0,
                items: Vec::new(),
            }],
        }
    }

    /// Run the tokenizer.
    pub fn tokenize(mut self) -> Result<GroupSpec, Vec<Diagnostic>> {
        if self.hed_string.trim().is_empty() {
            self.report(codes::EMPTY_TAG_FOUND, 0);
            return Err(self.issues);
        }

        for (i, c) in self.hed_string.char_indices() {
            self.handle_character(i, c);
            if !self.issues.is_empty() {
                debug!(
                    "tokenizer stopped at byte {i} of {:?}: {}",
                    self.hed_string, self.issues[0].id
                );
                return Err(self.issues);
            }
        }

        self.finalize();
        if !self.issues.is_empty() {
            debug!(
                "tokenizer found {} issue(s) at the end of {:?}",
                self.issues.len(),
                self.hed_string
            );
            return Err(self.issues);
        }

        let items = self
            .groups
            .into_iter()
            .next()
            .map(|root| root.items)
            .unwrap_or_default();
        let root = GroupSpec {
            span: Span::new(0, self.hed_string.len()),
            items,
        };
        trace!(
            "tokenized {:?} into {} tag(s)",
            self.hed_string,
            root.all_tags().len()
        );
        Ok(root)
    }

    fn handle_character(&mut self, i: usize, c: char) {
        match c {
            '(' => self.open_group(i),
            ')' => self.close_group_delimiter(i),
            '{' => self.open_column(i),
            '}' => self.close_column(i),
            ',' => self.comma(i),
            ':' => self.colon(i),
            '/' => self.slash(i),
            c if is_invalid_character(c) => {
                self.report_with(
                    codes::INVALID_CHARACTER,
                    "default",
                    i,
                    ("character", character_name(c)),
                );
            }
            c => self.current_token.push(c),
        }
    }

    fn comma(&mut self, i: usize) {
        let trimmed = self.text_since_delimiter(i).trim().to_string();
        match self.last_delimiter {
            None | Some((Delimiter::OpeningGroup | Delimiter::Comma, _)) if trimmed.is_empty() => {
                self.report(codes::EMPTY_TAG_FOUND, i);
                return;
            }
            Some((Delimiter::OpeningColumn, pos)) => {
                self.report(codes::UNCLOSED_CURLY_BRACE, pos);
                return;
            }
            Some((Delimiter::ClosingGroup | Delimiter::ClosingColumn, _)) if !trimmed.is_empty() => {
                self.report_with(codes::INVALID_TAG, "afterGroup", i, ("tag", trimmed));
                return;
            }
            _ => {}
        }
        if trimmed.is_empty() {
            self.reset_token(i);
        } else {
            self.push_tag(i);
        }
        self.last_delimiter = Some((Delimiter::Comma, i));
    }

    fn slash(&mut self, i: usize) {
        if self.current_token.trim().is_empty() {
            self.report(codes::EXTRA_SLASH, i);
            return;
        }
        if let Some(last) = self.last_slash {
            if self.hed_string[last + 1..i].trim().is_empty() {
                self.report(codes::EXTRA_SLASH, i);
                return;
            }
        }
        let bytes = self.hed_string.as_bytes();
        if i > 0 && bytes[i - 1] == b' ' {
            self.report(codes::EXTRA_BLANK, i - 1);
            return;
        }
        if bytes.get(i + 1) == Some(&b' ') {
            self.report(codes::EXTRA_BLANK, i + 1);
            return;
        }
        if self.hed_string[i + 1..].trim().is_empty() {
            self.report(codes::EXTRA_SLASH, i);
            return;
        }
        self.current_token.push('/');
        self.last_slash = Some(i);
    }

    fn open_group(&mut self, i: usize) {
        match self.last_delimiter {
            Some((Delimiter::OpeningColumn, pos)) => self.report(codes::UNCLOSED_CURLY_BRACE, pos),
            Some((Delimiter::ClosingColumn, pos)) => self.report(codes::COMMA_MISSING, pos),
            Some((Delimiter::ClosingGroup, pos)) => self.report(codes::COMMA_MISSING, pos + 1),
            _ if !self.current_token.trim().is_empty() => {
                let tag = self.current_token.trim().to_string();
                self.report_with(codes::COMMA_MISSING, "tag", i, ("tag", tag));
            }
            _ => {
                self.groups.push(GroupFrame {
                    start: i,
                    items: Vec::new(),
                });
                self.reset_token(i);
                self.last_delimiter = Some((Delimiter::OpeningGroup, i));
            }
        }
    }

    fn close_group_delimiter(&mut self, i: usize) {
        if self.groups.len() <= 1 {
            self.report(codes::UNOPENED_PARENTHESIS, i);
            return;
        }
        match self.last_delimiter {
            Some((Delimiter::OpeningColumn, pos)) => {
                self.report(codes::UNCLOSED_CURLY_BRACE, pos);
                return;
            }
            Some((Delimiter::OpeningGroup | Delimiter::Comma, _)) => {
                self.push_tag(i);
                if !self.issues.is_empty() {
                    return;
                }
            }
            _ if !self.current_token.trim().is_empty() => {
                let tag = self.current_token.trim().to_string();
                self.report_with(codes::COMMA_MISSING, "tag", i, ("tag", tag));
                return;
            }
            _ => {}
        }
        self.close_group(i);
        self.last_delimiter = Some((Delimiter::ClosingGroup, i));
    }

    fn close_group(&mut self, i: usize) {
        let Some(frame) = self.groups.pop() else {
            return;
        };
        let group = GroupSpec {
            span: Span::new(frame.start, i + 1),
            items: frame.items,
        };
        if let Some(parent) = self.groups.last_mut() {
            parent.items.push(TokenItem::Group(group));
        }
    }

    fn open_column(&mut self, i: usize) {
        if !self.current_token.trim().is_empty() {
            self.report_with(
                codes::INVALID_CHARACTER,
                "default",
                i,
                ("character", character_name('{')),
            );
        } else if matches!(self.last_delimiter, Some((Delimiter::OpeningColumn, _))) {
            self.report(codes::NESTED_CURLY_BRACE, i);
        } else {
            self.last_delimiter = Some((Delimiter::OpeningColumn, i));
        }
    }

    fn close_column(&mut self, i: usize) {
        let Some((Delimiter::OpeningColumn, open)) = self.last_delimiter else {
            self.report(codes::UNOPENED_CURLY_BRACE, i);
            return;
        };
        let column_name = self.current_token.trim().to_string();
        if column_name.is_empty() {
            self.report(codes::EMPTY_CURLY_BRACE, i);
            return;
        }
        self.current_items().push(TokenItem::ColumnSplice(ColumnSpliceSpec {
            column_name,
            span: Span::new(open, i + 1),
        }));
        self.reset_token(i);
        self.last_delimiter = Some((Delimiter::ClosingColumn, i));
    }

    fn colon(&mut self, i: usize) {
        let trimmed = self.current_token.trim();
        if !self.library.is_empty() || trimmed.contains(' ') || trimmed.contains('/') {
            self.current_token.push(':');
            return;
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            self.report(codes::INVALID_TAG_PREFIX, i);
            return;
        }
        let library = trimmed.to_string();
        self.reset_token(i);
        self.library = library;
    }

    fn finalize(&mut self) {
        match self.last_delimiter {
            Some((Delimiter::OpeningColumn, pos)) => {
                self.report(codes::UNCLOSED_CURLY_BRACE, pos);
                return;
            }
            Some((Delimiter::Comma, pos)) if self.hed_string[pos + 1..].trim().is_empty() => {
                self.report(codes::EMPTY_TAG_FOUND, pos);
                return;
            }
            _ => {}
        }

        let token_blank = self.current_token.trim().is_empty();
        if !token_blank {
            if let Some((Delimiter::ClosingGroup | Delimiter::ClosingColumn, pos)) =
                self.last_delimiter
            {
                self.report(codes::COMMA_MISSING, pos + 1);
                return;
            }
            self.push_tag(self.hed_string.len());
            if !self.issues.is_empty() {
                return;
            }
        } else if let Some((Delimiter::OpeningGroup, pos)) = self.last_delimiter {
            self.report(codes::UNCLOSED_PARENTHESES, pos);
            return;
        }

        while self.groups.len() > 1 {
            if let Some(frame) = self.groups.pop() {
                self.report(codes::UNCLOSED_PARENTHESIS, frame.start);
            }
        }
    }

    fn push_tag(&mut self, i: usize) {
        let trimmed = self.current_token.trim();
        if trimmed.is_empty() {
            self.report(codes::EMPTY_TAG_FOUND, i);
            return;
        }
        if has_invalid_placeholder(trimmed) {
            let tag = trimmed.to_string();
            self.report_with(codes::INVALID_PLACEHOLDER, "default", i, ("tag", tag));
            return;
        }
        let leading = self.current_token.len() - self.current_token.trim_start().len();
        let start = self.starting_index + leading;
        let tag = TagSpec {
            tag: trimmed.to_string(),
            span: Span::new(start, start + trimmed.len()),
            library: self.library.clone(),
        };
        self.current_items().push(TokenItem::Tag(tag));
        self.reset_token(i);
    }

    fn reset_token(&mut self, i: usize) {
        self.starting_index = i + 1;
        self.current_token.clear();
        self.library.clear();
        self.last_slash = None;
    }

    fn current_items(&mut self) -> &mut Vec<TokenItem> {
        let root_or_open = self.groups.len() - 1;
        &mut self.groups[root_or_open].items
    }

    fn text_since_delimiter(&self, end: usize) -> &'a str {
        let start = self.last_delimiter.map_or(0, |(_, pos)| pos + 1);
        &self.hed_string[start..end]
    }

    fn report(&mut self, id: &'static str, index: usize) {
        let context = self.base_context(index);
        self.push_issue(id, "default", index, context);
    }

    fn report_with(&mut self, id: &'static str, variant: &str, index: usize, extra: (&str, String)) {
        let mut context = self.base_context(index);
        context.insert(extra.0.to_string(), extra.1);
        self.push_issue(id, variant, index, context);
    }

    fn base_context(&self, index: usize) -> BTreeMap<String, String> {
        ctx!("index" => index.to_string(), "string" => self.hed_string)
    }

    fn push_issue(
        &mut self,
        id: &'static str,
        variant: &str,
        index: usize,
        context: BTreeMap<String, String>,
    ) {
        let width = self
            .hed_string
            .get(index..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        self.issues
            .push(issue(id, variant, Some(Span::new(index, index + width)), context));
    }
}

/// A `#` must come right after a slash, appear once, and be followed by
/// nothing or a blank and units.
fn has_invalid_placeholder(tag: &str) -> bool {
    let parts: Vec<&str> = tag.split('#').collect();
    match parts.as_slice() {
        [_] => false,
        [before, after] => {
            !before.ends_with('/') || (!after.trim().is_empty() && !after.starts_with(' '))
        }
        _ => true,
    }
}
