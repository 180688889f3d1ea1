//! Named schema entries and the managers that index them.

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::source::{AttributeMap, AttributeValue};
use crate::special::SpecialTags;
use crate::tags::TagManager;
use crate::units::SchemaUnitClass;
use crate::value_classes::SchemaValueClass;

/// Boolean and value attributes of a schema entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    boolean: BTreeSet<String>,
    values: BTreeMap<String, Vec<String>>,
}

impl Attributes {
    /// Convert the attribute map of a schema document.
    pub fn from_source(map: &AttributeMap) -> Self {
        let mut attributes = Self::default();
        for (name, value) in map {
            match value {
                AttributeValue::Flag(true) => {
                    attributes.boolean.insert(name.clone());
                }
                AttributeValue::Flag(false) => {}
                AttributeValue::One(value) => {
                    attributes.values.insert(name.clone(), vec![value.clone()]);
                }
                AttributeValue::Many(values) => {
                    attributes.values.insert(name.clone(), values.clone());
                }
            }
        }
        attributes
    }

    /// Whether the attribute is present, as a boolean or with a value.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.boolean.contains(name) || self.values.contains_key(name)
    }

    /// Whether the boolean attribute is set.
    pub fn has_boolean_attribute(&self, name: &str) -> bool {
        self.boolean.contains(name)
    }

    /// First value of a value attribute.
    pub fn attribute_value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a value attribute (empty when absent).
    pub fn attribute_values(&self, name: &str) -> &[String] {
        self.values.get(name).map_or(&[], Vec::as_slice)
    }

    /// Names of the boolean attributes that are set.
    pub fn boolean_attributes(&self) -> impl Iterator<Item = &str> {
        self.boolean.iter().map(String::as_str)
    }

    pub(crate) fn insert_boolean(&mut self, name: &str) {
        self.boolean.insert(name.to_string());
    }
}

/// Common interface of every named schema entry.
pub trait SchemaEntry {
    /// Entry name as written in the schema.
    fn name(&self) -> &str;

    /// Entry attributes.
    fn attributes(&self) -> &Attributes;

    /// Whether the attribute is present.
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes().has_attribute(name)
    }

    /// Whether the boolean attribute is set.
    fn has_boolean_attribute(&self, name: &str) -> bool {
        self.attributes().has_boolean_attribute(name)
    }

    /// First value of a value attribute.
    fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attributes().attribute_value(name)
    }
}

/// Insertion-ordered entries of one kind, looked up by name.
///
/// Names are case-insensitive by default. Unit modifiers and units are
/// case-sensitive (`m` is milli, `M` is mega).
#[derive(Debug, Clone)]
pub struct EntryManager<T> {
    kind: &'static str,
    case_sensitive: bool,
    entries: IndexMap<String, T>,
}

impl<T: SchemaEntry> EntryManager<T> {
    /// Empty manager with case-insensitive lookup.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            case_sensitive: false,
            entries: IndexMap::new(),
        }
    }

    /// Empty manager with exact-case lookup.
    pub fn case_sensitive(kind: &'static str) -> Self {
        Self {
            case_sensitive: true,
            ..Self::new(kind)
        }
    }

    fn key(&self, name: &str) -> String {
        if self.case_sensitive {
            name.to_string()
        } else {
            name.to_lowercase()
        }
    }

    pub(crate) fn insert(&mut self, entry: T) -> Result<(), SchemaError> {
        let key = self.key(entry.name());
        if self.entries.contains_key(&key) {
            return Err(SchemaError::DuplicateEntry {
                kind: self.kind,
                name: entry.name().to_string(),
            });
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Look an entry up by name.
    pub fn get_entry(&self, name: &str) -> Option<&T> {
        self.entries.get(&self.key(name))
    }

    /// Whether an entry with this name exists.
    pub fn has_entry(&self, name: &str) -> bool {
        self.get_entry(name).is_some()
    }

    /// Entries that have the given boolean attribute set.
    pub fn entries_with_boolean_attribute<'a>(
        &'a self,
        attribute: &'a str,
    ) -> impl Iterator<Item = &'a T> + 'a {
        self.iter()
            .filter(move |entry| entry.has_boolean_attribute(attribute))
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A property that attribute definitions can carry.
#[derive(Debug, Clone)]
pub struct SchemaProperty {
    name: String,
    attributes: Attributes,
}

impl SchemaProperty {
    /// Property with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::default(),
        }
    }
}

impl SchemaEntry for SchemaProperty {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// An attribute definition.
#[derive(Debug, Clone)]
pub struct SchemaAttribute {
    name: String,
    properties: BTreeSet<String>,
    attributes: Attributes,
}

impl SchemaAttribute {
    /// Attribute with the given properties.
    pub fn new(name: impl Into<String>, properties: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            properties: properties.into_iter().collect(),
            attributes: Attributes::default(),
        }
    }

    /// Whether the definition carries a property.
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.contains(property)
    }

    /// Whether tags pass this attribute on to their descendants.
    pub fn is_inherited(&self) -> bool {
        self.has_property("isInheritedProperty")
    }

    /// Entry kinds this attribute applies to. Attributes without an element
    /// property apply to tags.
    pub fn roles(&self) -> Vec<&'static str> {
        let roles: Vec<&'static str> = [
            ("unitClassProperty", "unitClass"),
            ("unitModifierProperty", "unitModifier"),
            ("unitProperty", "unit"),
            ("valueClassProperty", "valueClass"),
            ("elementProperty", "element"),
        ]
        .into_iter()
        .filter(|(property, _)| self.has_property(property))
        .map(|(_, role)| role)
        .collect();
        if roles.is_empty() { vec!["tag"] } else { roles }
    }
}

impl SchemaEntry for SchemaAttribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// An SI unit modifier (`k`, `kilo`, `m`, `milli`, ...).
#[derive(Debug, Clone)]
pub struct SchemaUnitModifier {
    name: String,
    attributes: Attributes,
}

impl SchemaUnitModifier {
    /// Modifier with the given attributes.
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Whether this modifier applies to full unit names (`kilo`).
    pub fn is_si_unit_modifier(&self) -> bool {
        self.has_boolean_attribute("SIUnitModifier")
    }

    /// Whether this modifier applies to unit symbols (`k`).
    pub fn is_si_unit_symbol_modifier(&self) -> bool {
        self.has_boolean_attribute("SIUnitSymbolModifier")
    }
}

impl SchemaEntry for SchemaUnitModifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Every entry of one HED-3 schema.
#[derive(Debug, Clone)]
pub struct SchemaEntries {
    pub(crate) properties: EntryManager<SchemaProperty>,
    pub(crate) attributes: EntryManager<SchemaAttribute>,
    pub(crate) unit_modifiers: EntryManager<SchemaUnitModifier>,
    pub(crate) unit_classes: EntryManager<SchemaUnitClass>,
    pub(crate) value_classes: EntryManager<SchemaValueClass>,
    pub(crate) tags: TagManager,
    pub(crate) special: SpecialTags,
}

impl SchemaEntries {
    /// Attribute properties.
    pub fn properties(&self) -> &EntryManager<SchemaProperty> {
        &self.properties
    }

    /// Attribute definitions.
    pub fn attributes(&self) -> &EntryManager<SchemaAttribute> {
        &self.attributes
    }

    /// Unit modifiers.
    pub fn unit_modifiers(&self) -> &EntryManager<SchemaUnitModifier> {
        &self.unit_modifiers
    }

    /// Unit classes.
    pub fn unit_classes(&self) -> &EntryManager<SchemaUnitClass> {
        &self.unit_classes
    }

    /// Value classes.
    pub fn value_classes(&self) -> &EntryManager<SchemaValueClass> {
        &self.value_classes
    }

    /// The tag hierarchy.
    pub fn tags(&self) -> &TagManager {
        &self.tags
    }

    /// Special tag sets.
    pub fn special(&self) -> &SpecialTags {
        &self.special
    }

    /// Whether the tag named by the last segment of `tag` has an attribute.
    ///
    /// A trailing `#` segment refers to the value tag of the segment before it.
    pub fn tag_has_attribute(&self, tag: &str, attribute: &str) -> bool {
        let mut segments = tag.rsplit('/');
        let Some(last) = segments.next() else {
            return false;
        };
        let id = if last == "#" {
            segments
                .next()
                .and_then(|name| self.tags.lookup(name))
                .and_then(|id| self.tags.get(id).value_tag())
        } else {
            self.tags.lookup(last)
        };
        id.is_some_and(|id| self.tags.get(id).has_attribute(attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> AttributeMap {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn attributes_split_boolean_and_values() {
        let attributes = Attributes::from_source(&map(
            r#"{ "requireChild": true, "unique": false, "unitClass": ["a", "b"], "defaultUnits": "s" }"#,
        ));
        assert!(attributes.has_boolean_attribute("requireChild"));
        assert!(!attributes.has_attribute("unique"));
        assert!(attributes.has_attribute("unitClass"));
        assert!(!attributes.has_boolean_attribute("unitClass"));
        assert_eq!(attributes.attribute_value("unitClass"), Some("a"));
        assert_eq!(attributes.attribute_values("unitClass"), ["a", "b"]);
        assert_eq!(attributes.attribute_value("defaultUnits"), Some("s"));
        assert!(attributes.attribute_values("missing").is_empty());
    }

    #[test]
    fn manager_lookup_is_case_insensitive_by_default() {
        let mut manager = EntryManager::new("property");
        manager.insert(SchemaProperty::new("boolProperty")).unwrap();
        assert!(manager.has_entry("BOOLPROPERTY"));
        assert_eq!(manager.len(), 1);
        let err = manager.insert(SchemaProperty::new("BoolProperty")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateEntry { kind: "property", .. }));
    }

    #[test]
    fn case_sensitive_manager_keeps_m_and_capital_m_apart() {
        let mut manager = EntryManager::case_sensitive("unit modifier");
        let symbol = Attributes::from_source(&map(r#"{ "SIUnitSymbolModifier": true }"#));
        manager
            .insert(SchemaUnitModifier::new("m", symbol.clone()))
            .unwrap();
        manager.insert(SchemaUnitModifier::new("M", symbol)).unwrap();
        manager
            .insert(SchemaUnitModifier::new(
                "milli",
                Attributes::from_source(&map(r#"{ "SIUnitModifier": true }"#)),
            ))
            .unwrap();
        assert_eq!(manager.len(), 3);
        assert!(!manager.has_entry("MILLI"));
        let symbols: Vec<&str> = manager
            .entries_with_boolean_attribute("SIUnitSymbolModifier")
            .map(SchemaEntry::name)
            .collect();
        assert_eq!(symbols, ["m", "M"]);
    }

    #[test]
    fn attribute_roles_and_inheritance() {
        let inherited = SchemaAttribute::new(
            "extensionAllowed",
            ["boolProperty".to_string(), "isInheritedProperty".to_string()],
        );
        assert!(inherited.is_inherited());
        assert_eq!(inherited.roles(), ["tag"]);

        let unit = SchemaAttribute::new("SIUnit", ["unitProperty".to_string()]);
        assert!(!unit.is_inherited());
        assert_eq!(unit.roles(), ["unit"]);
    }
}
