//! A single tag of a parsed HED string.
//!
//! How much a [`ParsedHedTag`] knows depends on the schema collection it
//! was parsed with: nothing beyond its text without schemas, an attribute
//! table for HED-2 schemas, and the full tag hierarchy (value, units,
//! extension, long and short forms) for HED-3 schemas.

use std::fmt;
use std::sync::{Arc, OnceLock};

use hed_toolchain_schema::{
    ParseStrategy, Schema, SchemaEntries, SchemaEntry, SchemaTag, SchemaUnit, SchemaUnitClass,
    Schemas, TagId,
};
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::grammar::diag::{Diagnostic, Span, codes};
use crate::grammar::spec::TagSpec;
use crate::issues::issue;

use super::converter::TagConverter;

#[derive(Debug, Clone)]
enum TagForm {
    /// No schema: the tag is only text.
    Plain,
    /// HED-2: attributes come from the schema's attribute table.
    Legacy(Arc<Schema>),
    /// HED-3: resolved to a node of the tag hierarchy.
    Resolved(Resolved),
}

#[derive(Debug, Clone)]
struct Resolved {
    schema: Arc<Schema>,
    tag: TagId,
    remainder: String,
    value: Option<ValueParts>,
}

#[derive(Debug, Clone, Default)]
struct ValueParts {
    value: String,
    units: Option<String>,
    // (unit class name, unit name)
    unit: Option<(String, String)>,
    split_value: Option<String>,
}

/// A tag of a HED string, resolved against the schema its prefix names.
#[derive(Debug, Clone)]
pub struct ParsedHedTag {
    original_tag: String,
    span: Span,
    library: String,
    form: TagForm,
    canonical_tag: String,
    formatted_tag: String,
    normalized: String,
    valid_units: OnceLock<Vec<String>>,
}

impl ParsedHedTag {
    /// Parse a tag the way the collection's generation calls for.
    pub fn new(spec: &TagSpec, schemas: &Schemas) -> Result<Self, Diagnostic> {
        match schemas.parse_strategy() {
            ParseStrategy::SyntaxOnly => Ok(Self::plain(spec)),
            ParseStrategy::Legacy => Self::legacy(spec, schemas),
            ParseStrategy::Entries => Self::resolve(spec, schemas),
        }
    }

    /// A tag without schema information.
    pub fn plain(spec: &TagSpec) -> Self {
        Self::build(spec, TagForm::Plain, spec.tag.clone())
    }

    /// A tag checked against a HED-2 attribute table.
    pub fn legacy(spec: &TagSpec, schemas: &Schemas) -> Result<Self, Diagnostic> {
        let schema = schema_for(spec, schemas)?;
        Ok(Self::legacy_with(spec, schema))
    }

    fn legacy_with(spec: &TagSpec, schema: &Arc<Schema>) -> Self {
        let canonical = spec.tag.trim_matches('/').to_string();
        Self::build(spec, TagForm::Legacy(Arc::clone(schema)), canonical)
    }

    /// A tag resolved against a HED-3 tag hierarchy.
    ///
    /// Fails with the first conversion issue: an unknown prefix, a tag the
    /// hierarchy rejects, or a value its classes and units reject.
    pub fn resolve(spec: &TagSpec, schemas: &Schemas) -> Result<Self, Diagnostic> {
        let schema = schema_for(spec, schemas)?;
        let Some(entries) = schema.entries() else {
            return Ok(Self::legacy_with(spec, schema));
        };
        let converted = TagConverter::new(spec, entries).convert()?;
        let value = value_parts(spec, entries, converted.tag, &converted.remainder)?;
        let canonical = entries
            .tags()
            .get(converted.tag)
            .long_extend(&converted.remainder);
        let resolved = Resolved {
            schema: Arc::clone(schema),
            tag: converted.tag,
            remainder: converted.remainder,
            value,
        };
        Ok(Self::build(spec, TagForm::Resolved(resolved), canonical))
    }

    fn build(spec: &TagSpec, form: TagForm, canonical_tag: String) -> Self {
        let formatted_tag = canonical_tag.to_lowercase();
        let mut tag = Self {
            original_tag: spec.tag.clone(),
            span: spec.span,
            library: spec.library.clone(),
            form,
            canonical_tag,
            formatted_tag,
            normalized: String::new(),
            valid_units: OnceLock::new(),
        };
        tag.normalized = tag.format(false);
        tag
    }

    // ── Text forms ──────────────────────────────────────────────────────

    /// The tag as written, without its prefix.
    pub fn original_tag(&self) -> &str {
        &self.original_tag
    }

    /// Span of the tag text in the HED string.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Schema prefix; empty for the base schema.
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Long form for HED-3 tags, the tag as written otherwise.
    pub fn canonical_tag(&self) -> &str {
        &self.canonical_tag
    }

    /// Lowercase canonical form, used for comparisons.
    pub fn formatted_tag(&self) -> &str {
        &self.formatted_tag
    }

    /// Short form with prefix, computed once at construction.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Long or short form, with the library prefix.
    ///
    /// Tags without a resolved schema tag keep their original text.
    pub fn format(&self, long: bool) -> String {
        let body = match (&self.form, self.resolved_entries()) {
            (TagForm::Resolved(resolved), Some(entries)) => {
                let tag = entries.tags().get(resolved.tag);
                if long {
                    tag.long_extend(&resolved.remainder)
                } else {
                    tag.extend(&resolved.remainder)
                }
            }
            _ => self.original_tag.clone(),
        };
        format!("{}{body}", self.prefix())
    }

    fn prefix(&self) -> String {
        if self.library.is_empty() {
            String::new()
        } else {
            format!("{}:", self.library)
        }
    }

    /// Last level of the tag as written.
    pub fn original_tag_name(&self) -> &str {
        Self::tag_name(&self.original_tag)
    }

    /// Formatted tag with its last level removed.
    pub fn parent_formatted_tag(&self) -> &str {
        Self::parent_tag(&self.formatted_tag)
    }

    /// Last level of a slash-separated tag.
    pub fn tag_name(tag: &str) -> &str {
        tag.rsplit_once('/').map_or(tag, |(_, name)| name)
    }

    /// A slash-separated tag with its last level removed; the tag itself
    /// when it has a single level.
    pub fn parent_tag(tag: &str) -> &str {
        tag.rsplit_once('/').map_or(tag, |(parent, _)| parent)
    }

    /// A tag followed by each of its ancestors, dropping one level at a time.
    pub fn ancestor_iter(tag: &str) -> impl Iterator<Item = &str> {
        std::iter::successors(Some(tag), |&current| {
            current.rsplit_once('/').map(|(parent, _)| parent)
        })
    }

    // ── Schema information ──────────────────────────────────────────────

    /// Schema the tag was parsed with.
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match &self.form {
            TagForm::Plain => None,
            TagForm::Legacy(schema) => Some(schema),
            TagForm::Resolved(resolved) => Some(&resolved.schema),
        }
    }

    fn resolved(&self) -> Option<&Resolved> {
        match &self.form {
            TagForm::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }

    fn resolved_entries(&self) -> Option<&SchemaEntries> {
        self.resolved()?.schema.entries()
    }

    fn resolved_tag(&self) -> Option<&SchemaTag> {
        let resolved = self.resolved()?;
        Some(resolved.schema.entries()?.tags().get(resolved.tag))
    }

    /// The schema tag this tag names: the deepest schema tag on its path
    /// that is not a value tag.
    pub fn schema_tag(&self) -> Option<&SchemaTag> {
        let tag = self.resolved_tag()?;
        if !tag.is_value_tag() {
            return Some(tag);
        }
        let entries = self.resolved_entries()?;
        tag.parent().map(|parent| entries.tags().get(parent))
    }

    /// The value tag this tag's value was matched against.
    pub fn takes_value_tag(&self) -> Option<&SchemaTag> {
        self.resolved_tag().filter(|tag| tag.is_value_tag())
    }

    /// Whether the tag carries a value.
    pub fn takes_value(&self) -> bool {
        match &self.form {
            TagForm::Plain => false,
            TagForm::Legacy(schema) => schema
                .attribute_table()
                .is_some_and(|table| table.takes_value(self.parent_formatted_tag())),
            TagForm::Resolved(_) => self.takes_value_tag().is_some(),
        }
    }

    /// Whether the tag has a schema attribute. Value tags answer for
    /// themselves.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        match &self.form {
            TagForm::Plain => false,
            TagForm::Legacy(schema) => schema.tag_has_attribute(&self.formatted_tag, attribute),
            TagForm::Resolved(_) => self
                .resolved_tag()
                .is_some_and(|tag| tag.has_attribute(attribute)),
        }
    }

    /// Whether the schema tag above this tag's last level has an attribute.
    pub fn parent_has_attribute(&self, attribute: &str) -> bool {
        match &self.form {
            TagForm::Plain => false,
            TagForm::Legacy(schema) => {
                schema.tag_has_attribute(self.parent_formatted_tag(), attribute)
            }
            TagForm::Resolved(resolved) => {
                // With a remainder the named schema tag is itself the parent.
                let parent = if resolved.remainder.is_empty() {
                    self.resolved_tag()
                        .and_then(SchemaTag::parent)
                        .and_then(|id| self.resolved_entries().map(|e| e.tags().get(id)))
                } else {
                    self.schema_tag()
                };
                parent.is_some_and(|parent| parent.has_attribute(attribute))
            }
        }
    }

    /// Extension text below the schema tag; `None` for values and for tags
    /// that end at a schema tag.
    pub fn extension(&self) -> Option<&str> {
        let resolved = self.resolved()?;
        if resolved.value.is_some() || resolved.remainder.is_empty() {
            return None;
        }
        Some(&resolved.remainder)
    }

    fn value_parts(&self) -> Option<&ValueParts> {
        self.resolved()?.value.as_ref()
    }

    /// The value without units.
    pub fn value(&self) -> Option<&str> {
        self.value_parts().map(|parts| parts.value.as_str())
    }

    /// The units as written.
    pub fn units(&self) -> Option<&str> {
        self.value_parts()?.units.as_deref()
    }

    /// Second level of a two-level value (`Def/Name/Value`).
    pub fn split_value(&self) -> Option<&str> {
        self.value_parts()?.split_value.as_deref()
    }

    /// The schema unit the value is written in.
    pub fn unit(&self) -> Option<&SchemaUnit> {
        let (class, unit) = self.value_parts()?.unit.as_ref()?;
        self.resolved_entries()?
            .unit_classes()
            .get_entry(class)?
            .units()
            .get_entry(unit)
    }

    /// Unit classes that apply to the value.
    pub fn unit_classes(&self) -> Vec<&SchemaUnitClass> {
        let (Some(tag), Some(entries)) = (self.takes_value_tag(), self.resolved_entries()) else {
            return Vec::new();
        };
        tag.unit_class_names()
            .iter()
            .filter_map(|name| entries.unit_classes().get_entry(name))
            .collect()
    }

    /// Whether any unit class applies to the value.
    pub fn has_unit_class(&self) -> bool {
        !self.unit_classes().is_empty()
    }

    /// Every unit spelling the value may be written in.
    pub fn valid_units(&self) -> &[String] {
        self.valid_units.get_or_init(|| {
            self.unit_classes()
                .into_iter()
                .flat_map(|class| class.units().iter())
                .flat_map(|unit| unit.derivative_units().iter().cloned())
                .collect()
        })
    }

    // ── Comparison ──────────────────────────────────────────────────────

    fn same_schema(&self, other: &ParsedHedTag) -> bool {
        match (self.schema(), other.schema()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Same schema and same formatted form.
    pub fn equivalent(&self, other: &ParsedHedTag) -> bool {
        self.same_schema(other) && self.formatted_tag == other.formatted_tag
    }

    /// Whether `other` is this tag or one of its ancestors.
    pub fn is_descendant_of(&self, other: &ParsedHedTag) -> bool {
        self.same_schema(other) && self.is_descendant_of_tag(&other.formatted_tag)
    }

    /// Whether a formatted tag (compared case-insensitively) is this tag or
    /// one of its ancestors.
    pub fn is_descendant_of_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        Self::ancestor_iter(&self.formatted_tag).any(|ancestor| ancestor == tag)
    }
}

impl fmt::Display for ParsedHedTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), self.original_tag)
    }
}

impl Serialize for ParsedHedTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParsedHedTag", 7)?;
        state.serialize_field("tag", &self.original_tag)?;
        state.serialize_field("library", &self.library)?;
        state.serialize_field("span", &self.span)?;
        state.serialize_field("long", &self.format(true))?;
        state.serialize_field("short", &self.normalized)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("units", &self.units())?;
        state.end()
    }
}

fn schema_for<'s>(spec: &TagSpec, schemas: &'s Schemas) -> Result<&'s Arc<Schema>, Diagnostic> {
    if let Some(schema) = schemas.get_schema(&spec.library) {
        return Ok(schema);
    }
    let diagnostic = if spec.library.is_empty() {
        issue(
            codes::UNMATCHED_BASE_SCHEMA,
            "default",
            Some(spec.span),
            ctx!("tag" => spec.tag.as_str()),
        )
    } else {
        issue(
            codes::UNMATCHED_LIBRARY_SCHEMA,
            "default",
            Some(spec.span),
            ctx!("tag" => spec.tag.as_str(), "library" => spec.library.as_str()),
        )
    };
    Err(diagnostic)
}

/// Split and check the value of a tag that resolved to a value tag.
fn value_parts(
    spec: &TagSpec,
    entries: &SchemaEntries,
    id: TagId,
    remainder: &str,
) -> Result<Option<ValueParts>, Diagnostic> {
    let tags = entries.tags();
    let tag = tags.get(id);
    if !tag.is_value_tag() {
        return Ok(None);
    }
    let value_issue = |code: &'static str| {
        issue(
            code,
            "default",
            Some(spec.span),
            ctx!("tag" => spec.tag.as_str()),
        )
    };

    let parent_name = tag.parent().map_or("", |parent| tags.get(parent).name());
    let special = entries.special();
    if remainder.is_empty()
        && (tag.has_attribute("requireChild") || special.requires_value(parent_name))
    {
        return Err(value_issue(codes::VALUE_REQUIRED));
    }

    let (value, split_value) = match remainder.split_once('/') {
        Some((first, rest)) if special.allows_two_level_value(parent_name) => {
            (first, Some(rest.to_string()))
        }
        _ => (remainder, None),
    };
    let mut parts = ValueParts {
        value: value.to_string(),
        split_value,
        ..ValueParts::default()
    };

    for class_name in tag.unit_class_names() {
        let Some(class) = entries.unit_classes().get_entry(class_name) else {
            continue;
        };
        let extracted = class.extract_unit(value);
        parts.value = extracted.value.to_string();
        parts.units = extracted.unit_string.map(str::to_string);
        if let Some(unit) = extracted.unit {
            parts.unit = Some((class.name().to_string(), unit.name().to_string()));
            break;
        }
    }
    if parts.units.is_some() && parts.unit.is_none() {
        return Err(value_issue(codes::UNIT_CLASS_INVALID_UNIT));
    }
    if !value_is_valid(entries, tag, &parts.value) {
        return Err(value_issue(codes::INVALID_VALUE));
    }
    Ok(Some(parts))
}

fn value_is_valid(entries: &SchemaEntries, tag: &SchemaTag, value: &str) -> bool {
    if value == "#" {
        return true;
    }
    let mut classes = tag
        .value_class_names()
        .iter()
        .filter_map(|name| entries.value_classes().get_entry(name))
        .peekable();
    if classes.peek().is_none() {
        return !value.contains(['{', '}', ',']);
    }
    classes.any(|class| class.validate_value(value))
}
