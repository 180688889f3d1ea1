//! HED-2 schemas: a flat attribute table keyed by long tag path.

use std::collections::{BTreeMap, HashMap};

use crate::entries::Attributes;
use crate::source::AttributeMap;

/// Attributes of every tag of a HED-2 schema, keyed by lower-cased long tag.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    tags: HashMap<String, Attributes>,
}

impl AttributeTable {
    /// Build the table from the `tagAttributes` section of a schema document.
    pub fn from_source(table: &BTreeMap<String, AttributeMap>) -> Self {
        let tags = table
            .iter()
            .map(|(tag, attributes)| {
                (
                    tag.trim_matches('/').to_lowercase(),
                    Attributes::from_source(attributes),
                )
            })
            .collect();
        Self { tags }
    }

    /// Whether the table lists `tag` (a long tag path, any case).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(&tag.to_lowercase())
    }

    /// Whether `tag` has `attribute`.
    pub fn tag_has_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.tags
            .get(&tag.to_lowercase())
            .is_some_and(|attributes| attributes.has_attribute(attribute))
    }

    /// Whether `tag` accepts a value, i.e. the table lists `tag/#`.
    pub fn takes_value(&self, tag: &str) -> bool {
        self.has_tag(&format!("{tag}/#"))
    }

    /// Number of tags in the table.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_slashes() {
        let source: BTreeMap<String, AttributeMap> = serde_json::from_str(
            r##"{
                "/Event/Category/": { "requireChild": true },
                "Attribute/Duration": {},
                "Attribute/Duration/#": { "unitClass": "time" }
            }"##,
        )
        .unwrap();
        let table = AttributeTable::from_source(&source);
        assert_eq!(table.len(), 3);
        assert!(table.has_tag("event/category"));
        assert!(table.tag_has_attribute("EVENT/CATEGORY", "requireChild"));
        assert!(!table.tag_has_attribute("event/category", "unique"));
        assert!(table.takes_value("attribute/duration"));
        assert!(!table.takes_value("event/category"));
        assert!(table.tag_has_attribute("attribute/duration/#", "unitClass"));
    }
}
