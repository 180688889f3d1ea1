//! Resolution of a slash-separated tag path against a schema's tag hierarchy.

use std::collections::BTreeMap;

use hed_toolchain_schema::{SchemaEntries, SchemaEntry, TagId};
use log::trace;

use crate::grammar::diag::{Diagnostic, codes};
use crate::grammar::spec::TagSpec;
use crate::issues::issue;

/// A resolved tag: the deepest schema tag the path reaches, plus the text
/// left over below it (a value or an extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedTag {
    /// Deepest matching schema tag. A value tag when the path ends in a value.
    pub tag: TagId,
    /// Levels below `tag`, joined with `/`. Empty when the path ends at `tag`.
    pub remainder: String,
}

/// Walks one tag path down the tag hierarchy of a schema.
///
/// The first level may be any schema tag (short form). Every further level
/// must be a child of the level before it, until the path reaches a tag
/// that takes a value or leaves the schema through an extension.
#[derive(Debug)]
pub struct TagConverter<'a> {
    spec: &'a TagSpec,
    entries: &'a SchemaEntries,
    levels: Vec<&'a str>,
}

impl<'a> TagConverter<'a> {
    /// Prepare to resolve `spec` against `entries`.
    pub fn new(spec: &'a TagSpec, entries: &'a SchemaEntries) -> Self {
        Self {
            spec,
            entries,
            levels: spec.tag.split('/').collect(),
        }
    }

    /// Resolve the tag.
    pub fn convert(&self) -> Result<ConvertedTag, Diagnostic> {
        let tags = self.entries.tags();
        let mut parent: Option<TagId> = None;

        for (index, level) in self.levels.iter().enumerate() {
            if let Some(value_tag) = parent.and_then(|id| tags.get(id).value_tag()) {
                return self.resolved(value_tag, index);
            }
            if level.is_empty() {
                return Err(self.invalid_tag());
            }
            match tags.lookup(level) {
                Some(child) => {
                    if index > 0 && tags.get(child).parent() != parent {
                        return Err(self.placement_issue(codes::INVALID_PARENT_NODE, index));
                    }
                    parent = Some(child);
                }
                None => {
                    let Some(parent_id) = parent else {
                        return Err(self.invalid_tag());
                    };
                    if !tags.get(parent_id).has_attribute("extensionAllowed") {
                        return Err(self.placement_issue(codes::INVALID_EXTENSION, index));
                    }
                    self.check_extensions(index)?;
                    return self.resolved(parent_id, index);
                }
            }
        }

        match parent {
            Some(tag) => self.resolved(tag, self.levels.len()),
            None => Err(self.invalid_tag()),
        }
    }

    /// Every level from `first` on is an extension: none may name a schema
    /// tag, and each must be a valid name.
    fn check_extensions(&self, first: usize) -> Result<(), Diagnostic> {
        let name_class = self.entries.value_classes().get_entry("nameClass");
        for (index, level) in self.levels.iter().enumerate().skip(first) {
            if level.is_empty() {
                return Err(self.invalid_tag());
            }
            if index > first && self.entries.tags().lookup(level).is_some() {
                return Err(self.placement_issue(codes::INVALID_PARENT_NODE, index));
            }
            if name_class.is_some_and(|class| !class.matches_char_class(level)) {
                return Err(self.placement_issue(codes::INVALID_EXTENSION, index));
            }
        }
        Ok(())
    }

    fn resolved(&self, tag: TagId, start: usize) -> Result<ConvertedTag, Diagnostic> {
        let remainder = self
            .levels
            .get(start..)
            .map(|rest| rest.join("/"))
            .unwrap_or_default();
        let schema_tag = self.entries.tags().get(tag);
        // An empty value tag is reported as a missing value later on.
        if remainder.is_empty()
            && !schema_tag.is_value_tag()
            && schema_tag.has_attribute("requireChild")
        {
            return Err(self.tag_issue(codes::CHILD_REQUIRED));
        }
        trace!(
            "resolved {:?} to {} with remainder {:?}",
            self.spec.tag,
            schema_tag.long_name(),
            remainder
        );
        Ok(ConvertedTag { tag, remainder })
    }

    fn invalid_tag(&self) -> Diagnostic {
        self.tag_issue(codes::INVALID_TAG)
    }

    fn tag_issue(&self, id: &'static str) -> Diagnostic {
        self.issue(id, ctx!("tag" => self.spec.tag.as_str()))
    }

    /// Issue about the level at `index`, naming the path above it.
    fn placement_issue(&self, id: &'static str, index: usize) -> Diagnostic {
        self.issue(
            id,
            ctx!(
                "tag" => self.levels[index],
                "parentTag" => self.levels[..index].join("/"),
            ),
        )
    }

    fn issue(&self, id: &'static str, context: BTreeMap<String, String>) -> Diagnostic {
        issue(id, "default", Some(self.spec.span), context)
    }
}
