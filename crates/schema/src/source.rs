//! Serde model of a schema document (JSON or JSONC).
//!
//! HED-3 documents carry a tag tree plus unit, value-class and attribute
//! definitions. HED-2 documents carry a flat `tagAttributes` table keyed by
//! long tag path instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attribute values of one entry, keyed by attribute name.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// One attribute value as written in a schema document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean attribute. `false` is the same as leaving it out.
    Flag(bool),
    /// Single-valued attribute.
    One(String),
    /// Multi-valued attribute.
    Many(Vec<String>),
}

/// Root of a schema document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSource {
    /// Schema version (`"8.3.0"`).
    pub version: String,
    /// Library name; empty for the standard schema.
    #[serde(default)]
    pub library: String,
    /// Whether a library schema was published without the standard schema
    /// merged in.
    #[serde(default)]
    pub unmerged: bool,
    /// Special tag sets used by the parser.
    #[serde(default)]
    pub special: Option<SpecialSource>,
    /// Attribute properties.
    #[serde(default)]
    pub properties: Vec<PropertySource>,
    /// Attribute definitions.
    #[serde(default)]
    pub attributes: Vec<AttributeSource>,
    /// SI unit modifiers.
    #[serde(default)]
    pub unit_modifiers: Vec<EntrySource>,
    /// Unit classes and their units.
    #[serde(default)]
    pub unit_classes: Vec<UnitClassSource>,
    /// Value classes.
    #[serde(default)]
    pub value_classes: Vec<ValueClassSource>,
    /// Top-level tags of the hierarchy.
    #[serde(default)]
    pub tags: Vec<TagSource>,
    /// HED-2 attribute table keyed by long tag path.
    #[serde(default)]
    pub tag_attributes: BTreeMap<String, AttributeMap>,
}

/// Schema-supplied special tag sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialSource {
    /// Tags whose value tag must always be given a value.
    #[serde(default)]
    pub require_value_tags: Vec<String>,
    /// Tags whose value may hold a second level (`Def/Name/Value`).
    #[serde(default)]
    pub allow_two_level_value_tags: Vec<String>,
}

/// A property that attributes can carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySource {
    /// Property name.
    pub name: String,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// An attribute definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeSource {
    /// Attribute name.
    pub name: String,
    /// Property names (`boolProperty`, `isInheritedProperty`, `unitProperty`, ...).
    #[serde(default)]
    pub properties: Vec<String>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// A named entry with attributes (unit modifiers, units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrySource {
    /// Entry name.
    pub name: String,
    /// Attribute values.
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// A unit class with its units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitClassSource {
    /// Unit class name.
    pub name: String,
    /// Attribute values (`defaultUnits`, ...).
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Units in declaration order.
    #[serde(default)]
    pub units: Vec<EntrySource>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// A value class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueClassSource {
    /// Value class name.
    pub name: String,
    /// Attribute values (`allowedCharacter`, ...).
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Regex every value must match as a whole, overriding the built-in
    /// word form for this class.
    #[serde(default)]
    pub word_pattern: Option<String>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

/// A node of the tag tree. A child named `#` is the parent's value tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSource {
    /// Short tag name.
    pub name: String,
    /// Attribute values.
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Child tags.
    #[serde(default)]
    pub children: Vec<TagSource>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}
