//! The tag hierarchy, stored as an arena indexed by [`TagId`].
//!
//! Parent and value-tag links are indices into the arena. Both are fixed
//! while the schema is built and never change afterwards.

use std::collections::HashMap;

use serde::Serialize;

use crate::entries::{Attributes, SchemaEntry};
use crate::error::SchemaError;

/// Index of a tag in its schema's [`TagManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TagId(u32);

impl TagId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node of the tag hierarchy.
#[derive(Debug, Clone)]
pub struct SchemaTag {
    name: String,
    attributes: Attributes,
    parent: Option<TagId>,
    value_tag: Option<TagId>,
    unit_classes: Vec<String>,
    value_classes: Vec<String>,
    long_name: String,
    // Name forms used when extending. A value tag borrows its parent's.
    short_form: String,
    long_form: String,
    is_value_tag: bool,
}

impl SchemaTag {
    /// Short name (`#` for value tags).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent tag, `None` for top-level tags.
    pub fn parent(&self) -> Option<TagId> {
        self.parent
    }

    /// The `#` child, if this tag takes a value.
    pub fn value_tag(&self) -> Option<TagId> {
        self.value_tag
    }

    /// Whether this is a `#` value tag.
    pub fn is_value_tag(&self) -> bool {
        self.is_value_tag
    }

    /// Full path from the root (`Property/.../Label/#` for value tags).
    pub fn long_name(&self) -> &str {
        &self.long_name
    }

    /// Names of the unit classes that apply to this tag's values.
    pub fn unit_class_names(&self) -> &[String] {
        &self.unit_classes
    }

    /// Names of the value classes that apply to this tag's values.
    pub fn value_class_names(&self) -> &[String] {
        &self.value_classes
    }

    /// Short form of this tag followed by `extension`.
    ///
    /// Value tags defer to their parent, so extending `Label/#` with `Foo`
    /// gives `Label/Foo`.
    pub fn extend(&self, extension: &str) -> String {
        join_extension(&self.short_form, extension)
    }

    /// Long form of this tag followed by `extension`.
    pub fn long_extend(&self, extension: &str) -> String {
        join_extension(&self.long_form, extension)
    }
}

fn join_extension(base: &str, extension: &str) -> String {
    if extension.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{extension}")
    }
}

impl SchemaEntry for SchemaTag {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Owner of every tag of a schema, with lookup by short name.
#[derive(Debug, Clone, Default)]
pub struct TagManager {
    tags: Vec<SchemaTag>,
    by_name: HashMap<String, TagId>,
}

impl TagManager {
    /// Tag for an id handed out by this manager.
    ///
    /// # Panics
    ///
    /// Panics when `id` comes from a different schema with more tags.
    pub fn get(&self, id: TagId) -> &SchemaTag {
        &self.tags[id.index()]
    }

    /// Id of the tag with this short name (case-insensitive). Value tags
    /// have no short name and are never found.
    pub fn lookup(&self, name: &str) -> Option<TagId> {
        self.by_name.get(&name.to_lowercase()).copied()
    }

    /// Tag with this short name (case-insensitive).
    pub fn get_entry(&self, name: &str) -> Option<&SchemaTag> {
        self.lookup(name).map(|id| self.get(id))
    }

    /// Strict ancestors of a tag, nearest first.
    pub fn ancestors(&self, id: TagId) -> impl Iterator<Item = TagId> + '_ {
        std::iter::successors(self.get(id).parent, |&parent| self.get(parent).parent)
    }

    /// All tags with their ids, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = (TagId, &SchemaTag)> {
        self.tags
            .iter()
            .enumerate()
            .map(|(index, tag)| (TagId(index as u32), tag))
    }

    /// Number of tags, value tags included.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the hierarchy is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Add a tag under `parent`. A tag named `#` becomes the parent's value
    /// tag; every other tag gets a short-name entry.
    pub(crate) fn push(
        &mut self,
        name: &str,
        attributes: Attributes,
        parent: Option<TagId>,
    ) -> Result<TagId, SchemaError> {
        let id = TagId(self.tags.len() as u32);
        let is_value_tag = name == "#";
        let (long_name, short_form, long_form) = match (parent.map(|p| self.get(p)), is_value_tag)
        {
            (Some(parent), true) => (
                format!("{}/#", parent.long_name),
                parent.name.clone(),
                parent.long_name.clone(),
            ),
            (None, true) => {
                return Err(SchemaError::InternalConsistency(
                    "value tag '#' at the top level".to_string(),
                ));
            }
            (Some(parent), false) => {
                let long = format!("{}/{name}", parent.long_name);
                (long.clone(), name.to_string(), long)
            }
            (None, false) => (name.to_string(), name.to_string(), name.to_string()),
        };

        if let Some(parent) = parent {
            let parent_tag = &self.tags[parent.index()];
            if parent_tag.is_value_tag {
                return Err(SchemaError::InternalConsistency(format!(
                    "value tag '{}' has children",
                    parent_tag.long_name
                )));
            }
        }

        if !is_value_tag {
            let key = name.to_lowercase();
            if let Some(&existing) = self.by_name.get(&key) {
                return Err(SchemaError::DuplicateTag {
                    name: name.to_string(),
                    existing: self.get(existing).long_name.clone(),
                });
            }
            self.by_name.insert(key, id);
        }

        let unit_classes = attributes.attribute_values("unitClass").to_vec();
        let value_classes = attributes.attribute_values("valueClass").to_vec();
        self.tags.push(SchemaTag {
            name: name.to_string(),
            attributes,
            parent,
            value_tag: None,
            unit_classes,
            value_classes,
            long_name,
            short_form,
            long_form,
            is_value_tag,
        });

        if let (Some(parent), true) = (parent, is_value_tag) {
            self.set_value_tag(parent, id)?;
        }
        Ok(id)
    }

    /// Record `value_tag` as the `#` child of `parent`. Write-once.
    fn set_value_tag(&mut self, parent: TagId, value_tag: TagId) -> Result<(), SchemaError> {
        let parent = &mut self.tags[parent.index()];
        if parent.value_tag.is_some() {
            return Err(SchemaError::InternalConsistency(format!(
                "tag '{}' has more than one value tag",
                parent.long_name
            )));
        }
        parent.value_tag = Some(value_tag);
        Ok(())
    }

    pub(crate) fn attributes_mut(&mut self, id: TagId) -> &mut Attributes {
        &mut self.tags[id.index()].attributes
    }
}
