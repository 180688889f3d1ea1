//! HED schema model for the HED toolchain.
//!
//! A [`Schema`] is built once from a schema document and shared read-only
//! (behind [`Arc`]) by every parse that uses it. HED-3 schemas carry the
//! full entry model ([`SchemaEntries`]); HED-2 schemas only an
//! [`AttributeTable`]. [`Schemas`] maps library nicknames to schemas and
//! decides which parsing strategy applies.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

mod builder;
pub mod entries;
pub mod error;
pub mod legacy;
pub mod loader;
pub mod source;
/// Schema-supplied sets of tags with special value handling.
pub mod special;
pub mod tags;
pub mod units;
pub mod value_classes;

pub use entries::{
    Attributes, EntryManager, SchemaAttribute, SchemaEntries, SchemaEntry, SchemaProperty,
    SchemaUnitModifier,
};
pub use error::SchemaError;
pub use legacy::AttributeTable;
pub use loader::{SchemaLoader, SchemaSpec, SchemasSpec};
pub use source::SchemaSource;
pub use special::SpecialTags;
pub use tags::{SchemaTag, TagId, TagManager};
pub use units::{ExtractedUnit, SchemaUnit, SchemaUnitClass};
pub use value_classes::SchemaValueClass;

/// Schema data for the schema's generation.
#[derive(Debug, Clone)]
pub enum SchemaData {
    /// HED-1 and HED-2: attribute table only.
    Legacy(AttributeTable),
    /// HED-3: the full entry model.
    Entries(SchemaEntries),
}

/// One loaded schema.
#[derive(Debug, Clone)]
pub struct Schema {
    version: String,
    library: String,
    generation: u8,
    data: SchemaData,
}

impl Schema {
    /// Build a schema from a parsed document.
    pub fn from_source(source: &SchemaSource) -> Result<Self, SchemaError> {
        let generation = schema_generation(&source.version, &source.library)?;
        let data = if generation >= 3 {
            SchemaData::Entries(builder::build_entries(source)?)
        } else {
            SchemaData::Legacy(AttributeTable::from_source(&source.tag_attributes))
        };
        Ok(Self {
            version: source.version.clone(),
            library: source.library.clone(),
            generation,
            data,
        })
    }

    /// Schema version (`"8.3.0"`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Library name; empty for the standard schema.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// HED generation: 1, 2 or 3.
    pub fn generation(&self) -> u8 {
        self.generation
    }

    /// Whether this is a HED-3 schema.
    pub fn is_hed3(&self) -> bool {
        self.generation == 3
    }

    /// Generation-specific data.
    pub fn data(&self) -> &SchemaData {
        &self.data
    }

    /// The entry model, for HED-3 schemas.
    pub fn entries(&self) -> Option<&SchemaEntries> {
        match &self.data {
            SchemaData::Entries(entries) => Some(entries),
            SchemaData::Legacy(_) => None,
        }
    }

    /// The attribute table, for HED-2 schemas.
    pub fn attribute_table(&self) -> Option<&AttributeTable> {
        match &self.data {
            SchemaData::Legacy(table) => Some(table),
            SchemaData::Entries(_) => None,
        }
    }

    /// Whether `tag` has `attribute`. HED-3 schemas look at the last
    /// segment of the tag; HED-2 schemas at the whole long tag.
    pub fn tag_has_attribute(&self, tag: &str, attribute: &str) -> bool {
        match &self.data {
            SchemaData::Entries(entries) => entries.tag_has_attribute(tag, attribute),
            SchemaData::Legacy(table) => table.tag_has_attribute(tag, attribute),
        }
    }

    /// File stem used for this schema (`HED8.3.0`, `HED_score_1.0.0`).
    pub fn local_name(&self) -> String {
        loader::local_name(&self.library, &self.version)
    }
}

/// HED generation of a schema version.
///
/// Library schemas are always HED-3. Otherwise versions below 4 are HED-1,
/// below 8 HED-2, and everything from `8.0.0-alpha` on HED-3.
pub fn schema_generation(version: &str, library: &str) -> Result<u8, SchemaError> {
    if !library.is_empty() {
        return Ok(3);
    }
    let major = version
        .split(['.', '-'])
        .next()
        .and_then(|major| major.parse::<u64>().ok())
        .ok_or_else(|| SchemaError::InvalidVersion(version.to_string()))?;
    Ok(match major {
        0..=3 => 1,
        4..=7 => 2,
        _ => 3,
    })
}

/// How HED strings are parsed against a schema collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseStrategy {
    /// No usable schema: check syntax only.
    SyntaxOnly,
    /// HED-2: attribute-table lookups, no tag resolution.
    Legacy,
    /// HED-3: full tag resolution.
    Entries,
}

impl ParseStrategy {
    /// Strategy for a collection generation.
    pub fn for_generation(generation: u8) -> Self {
        match generation {
            0 | 1 => Self::SyntaxOnly,
            2 => Self::Legacy,
            _ => Self::Entries,
        }
    }
}

/// Loaded schemas keyed by nickname. The empty nickname is the base schema.
///
/// A collection without a map means "syntax only".
#[derive(Debug, Clone, Default)]
pub struct Schemas {
    schemas: Option<IndexMap<String, Arc<Schema>>>,
}

impl Schemas {
    /// Collection from nickname → schema pairs.
    pub fn new(schemas: IndexMap<String, Arc<Schema>>) -> Self {
        Self {
            schemas: Some(schemas),
        }
    }

    /// Collection holding a single base schema.
    pub fn from_base(schema: Schema) -> Self {
        Self::new(IndexMap::from([(String::new(), Arc::new(schema))]))
    }

    /// Collection that checks syntax only.
    pub fn syntax_only() -> Self {
        Self { schemas: None }
    }

    /// Schema with this nickname.
    pub fn get_schema(&self, nickname: &str) -> Option<&Arc<Schema>> {
        self.schemas.as_ref()?.get(nickname)
    }

    /// Schema used for tags without a prefix.
    pub fn base_schema(&self) -> Option<&Arc<Schema>> {
        self.get_schema("")
    }

    /// First schema that is not a library schema.
    pub fn standard_schema(&self) -> Option<&Arc<Schema>> {
        self.iter()
            .map(|(_, schema)| schema)
            .find(|schema| schema.library().is_empty())
    }

    /// Schemas with a non-empty nickname.
    pub fn library_schemas(&self) -> impl Iterator<Item = (&str, &Arc<Schema>)> {
        self.iter().filter(|(nickname, _)| !nickname.is_empty())
    }

    /// All schemas in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Schema>)> {
        self.schemas
            .iter()
            .flat_map(|schemas| schemas.iter())
            .map(|(nickname, schema)| (nickname.as_str(), schema))
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.as_ref().map_or(0, IndexMap::len)
    }

    /// Whether the collection holds no schema.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generation of the collection: 0 without schemas, 3 with any library
    /// schema, otherwise the base schema's.
    pub fn generation(&self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        if self.library_schemas().next().is_some() {
            return 3;
        }
        self.base_schema().map_or(0, |schema| schema.generation())
    }

    /// Whether the collection is HED-3.
    pub fn is_hed3(&self) -> bool {
        self.generation() == 3
    }

    /// Whether only syntax can be checked.
    pub fn is_syntax_only(&self) -> bool {
        self.parse_strategy() == ParseStrategy::SyntaxOnly
    }

    /// Parsing strategy, chosen once per collection.
    pub fn parse_strategy(&self) -> ParseStrategy {
        ParseStrategy::for_generation(self.generation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(version: &str, library: &str) -> Schema {
        let source: SchemaSource = serde_json::from_str(&format!(
            r#"{{ "version": "{version}", "library": "{library}" }}"#
        ))
        .unwrap();
        Schema::from_source(&source).unwrap()
    }

    #[test]
    fn generations() {
        assert_eq!(schema_generation("3.0.0", "").unwrap(), 1);
        assert_eq!(schema_generation("7.2.0", "").unwrap(), 2);
        assert_eq!(schema_generation("8.0.0-alpha.1", "").unwrap(), 3);
        assert_eq!(schema_generation("8.3.0", "").unwrap(), 3);
        assert_eq!(schema_generation("1.0.0", "score").unwrap(), 3);
        assert!(matches!(
            schema_generation("latest", ""),
            Err(SchemaError::InvalidVersion(_))
        ));
    }

    #[test]
    fn legacy_and_entry_data() {
        let legacy = schema("7.2.0", "");
        assert!(legacy.attribute_table().is_some());
        assert!(legacy.entries().is_none());
        assert!(!legacy.is_hed3());

        let hed3 = schema("8.3.0", "");
        assert!(hed3.entries().is_some());
        assert_eq!(hed3.local_name(), "HED8.3.0");
        assert_eq!(schema("1.0.0", "score").local_name(), "HED_score_1.0.0");
    }

    #[test]
    fn collection_generation_and_strategy() {
        assert_eq!(Schemas::syntax_only().generation(), 0);
        assert!(Schemas::syntax_only().is_syntax_only());
        assert_eq!(Schemas::new(IndexMap::new()).generation(), 0);

        let legacy = Schemas::from_base(schema("7.2.0", ""));
        assert_eq!(legacy.generation(), 2);
        assert_eq!(legacy.parse_strategy(), ParseStrategy::Legacy);

        let hed1 = Schemas::from_base(schema("1.0.0", ""));
        assert_eq!(hed1.parse_strategy(), ParseStrategy::SyntaxOnly);

        let library_only = Schemas::new(IndexMap::from([(
            "sc".to_string(),
            Arc::new(schema("1.0.0", "score")),
        )]));
        assert_eq!(library_only.generation(), 3);
        assert!(library_only.base_schema().is_none());
        assert!(library_only.standard_schema().is_none());
        assert_eq!(library_only.library_schemas().count(), 1);
    }

    #[test]
    fn standard_schema_skips_libraries() {
        let schemas = Schemas::new(IndexMap::from([
            ("sc".to_string(), Arc::new(schema("1.0.0", "score"))),
            ("std".to_string(), Arc::new(schema("8.3.0", ""))),
        ]));
        let standard = schemas.standard_schema().unwrap();
        assert_eq!(standard.version(), "8.3.0");
        assert!(schemas.get_schema("std").is_some_and(|s| Arc::ptr_eq(s, standard)));
    }
}
