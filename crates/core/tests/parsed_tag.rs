mod common;

use std::sync::Arc;

use common::{LIBRARY_SCHEMAS, SCHEMA, SCHEMAS};
use hed_toolchain_core::{Diagnostic, ParsedHedTag, Span, TagConverter, TagSpec, tokenize};
use hed_toolchain_schema::loader::load_schema_from_str;
use hed_toolchain_schema::{SchemaEntry, Schemas};
use indexmap::IndexMap;

fn parse_with(input: &str, schemas: &Schemas) -> Result<ParsedHedTag, Diagnostic> {
    let root = tokenize(input).unwrap_or_else(|e| panic!("{input:?} should tokenize: {e:?}"));
    let spec = root.all_tags()[0].clone();
    ParsedHedTag::new(&spec, schemas)
}

fn parse(input: &str) -> ParsedHedTag {
    parse_with(input, &SCHEMAS).unwrap_or_else(|d| panic!("{input:?}: {}", d.message))
}

fn parse_err(input: &str) -> Diagnostic {
    match parse_with(input, &SCHEMAS) {
        Ok(tag) => panic!("{input:?} should fail, got {}", tag.format(true)),
        Err(d) => d,
    }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[test]
fn short_and_long_forms() {
    let tag = parse("Train/Maglev");
    assert_eq!(
        tag.format(true),
        "Item/Object/Man-made-object/Vehicle/Train/Maglev"
    );
    assert_eq!(tag.format(false), "Train/Maglev");
    assert_eq!(tag.normalized(), "Train/Maglev");
    assert_eq!(tag.canonical_tag(), tag.format(true));
    assert_eq!(
        tag.formatted_tag(),
        "item/object/man-made-object/vehicle/train/maglev"
    );
    assert_eq!(tag.extension(), Some("Maglev"));
    assert_eq!(tag.value(), None);
    assert_eq!(tag.schema_tag().map(|t| t.name()), Some("Train"));

    let long = parse("Item/Object/Man-made-object/Vehicle/Car");
    assert_eq!(long.format(false), "Car");
    assert_eq!(long.extension(), None);
}

#[test]
fn value_tags() {
    let tag = parse("Age/15");
    assert_eq!(tag.format(true), "Property/Agent-property/Agent-trait/Age/15");
    assert_eq!(tag.format(false), "Age/15");
    assert_eq!(tag.value(), Some("15"));
    assert_eq!(tag.units(), None);
    assert!(tag.takes_value());
    assert_eq!(tag.takes_value_tag().map(|t| t.name()), Some("#"));
    assert_eq!(tag.schema_tag().map(|t| t.name()), Some("Age"));
    assert!(tag.has_attribute("valueClass"));
    assert!(tag.parent_has_attribute("requireChild"));
    assert_eq!(tag.extension(), None);
    assert!(!tag.has_unit_class());

    let label = parse("Label");
    assert!(!label.takes_value());
    assert_eq!(label.value(), None);
}

#[test]
fn values_with_units() {
    let tag = parse("Duration/3 ms");
    assert_eq!(tag.value(), Some("3"));
    assert_eq!(tag.units(), Some("ms"));
    assert_eq!(tag.unit().map(|u| u.name()), Some("s"));
    assert!(tag.has_unit_class());
    assert_eq!(tag.unit_classes()[0].name(), "timeUnits");
    assert!(tag.valid_units().iter().any(|u| u == "ms"));
    assert!(tag.valid_units().iter().any(|u| u == "seconds"));
    assert!(tag.valid_units().iter().any(|u| u == "hours"));

    let cost = parse("Cost/$ 25.99");
    assert_eq!(cost.value(), Some("25.99"));
    assert_eq!(cost.units(), Some("$"));

    let placeholder = parse("Duration/# ms");
    assert_eq!(placeholder.value(), Some("#"));
    assert_eq!(placeholder.units(), Some("ms"));
}

#[test]
fn two_level_values() {
    let tag = parse("Def/MyDef/3");
    assert_eq!(tag.value(), Some("MyDef"));
    assert_eq!(tag.split_value(), Some("3"));
    assert_eq!(tag.format(true), "Property/Organizational-property/Def/MyDef/3");

    let label = parse("Label/Blech");
    assert_eq!(label.value(), Some("Blech"));
    assert_eq!(label.split_value(), None);
}

#[test]
fn library_prefix() {
    let tag = parse_with("sc:Event", &LIBRARY_SCHEMAS).unwrap();
    assert_eq!(tag.library(), "sc");
    assert_eq!(tag.format(false), "sc:Event");
    assert_eq!(tag.format(true), "sc:Event");
    assert_eq!(tag.to_string(), "sc:Event");
    assert_eq!(tag.formatted_tag(), "event");
}

// ─── Conversion issues ───────────────────────────────────────────────────────

#[test]
fn unknown_tags() {
    let d = parse_err("Junk");
    assert_eq!(d.id, "invalidTag");
    assert_eq!(d.context_value("tag"), Some("Junk"));
    assert_eq!(d.hed_code(), Some("TAG_INVALID"));
}

#[test]
fn required_children() {
    let d = parse_err("Age");
    assert_eq!(d.id, "childRequired");
    assert_eq!(d.message, "Tag \"Age\" requires a child.");
}

fn parse_spec(tag: &str, schemas: &Schemas) -> Result<ParsedHedTag, Diagnostic> {
    let spec = TagSpec {
        tag: tag.to_string(),
        span: Span::new(0, tag.len()),
        library: String::new(),
    };
    ParsedHedTag::new(&spec, schemas)
}

#[test]
fn required_values() {
    let d = parse_spec("Def/", &SCHEMAS).unwrap_err();
    assert_eq!(d.id, "valueRequired");
    assert_eq!(d.context_value("tag"), Some("Def/"));
    assert_eq!(d.span, Some(Span::new(0, 4)));

    let schema = load_schema_from_str(
        r##"{
            "version": "8.3.0",
            "tags": [
                { "name": "Marker", "children": [{ "name": "#", "attributes": { "requireChild": true } }] }
            ]
        }"##,
    )
    .unwrap();
    let schemas = Schemas::from_base(schema);
    let d = parse_spec("Marker/", &schemas).unwrap_err();
    assert_eq!(d.id, "valueRequired");
    assert_eq!(parse_spec("Marker/7", &schemas).unwrap().value(), Some("7"));
}

#[test]
fn prefix_unit_before_multibyte_value() {
    let d = parse_err("Cost/$\u{e9} 5");
    assert_eq!(d.id, "unitClassInvalidUnit");
    assert_eq!(d.context_value("tag"), Some("Cost/$\u{e9} 5"));
}

#[test]
fn extensions() {
    let d = parse_err("Event/Junk");
    assert_eq!(d.id, "invalidExtension");
    assert_eq!(d.context_value("tag"), Some("Junk"));
    assert_eq!(d.context_value("parentTag"), Some("Event"));

    let d = parse_err("Item/Obj ect");
    assert_eq!(d.id, "invalidExtension");
}

#[test]
fn misplaced_schema_tags() {
    let d = parse_err("Item/Train");
    assert_eq!(d.id, "invalidParentNode");
    assert_eq!(d.context_value("tag"), Some("Train"));
    assert_eq!(d.context_value("parentTag"), Some("Item"));

    let d = parse_err("Item/Object/Junk/Train");
    assert_eq!(d.id, "invalidParentNode");
    assert_eq!(d.context_value("parentTag"), Some("Item/Object/Junk"));

    assert_eq!(parse_err("Red/Blue").id, "invalidParentNode");
}

#[test]
fn invalid_values_and_units() {
    assert_eq!(parse_err("Age/abc").id, "invalidValue");
    assert_eq!(parse_err("Label/two words").id, "invalidValue");
    assert_eq!(parse_err("Duration/3 fortnights").id, "unitClassInvalidUnit");
    assert_eq!(parse_err("Onset-date/yesterday").id, "invalidValue");
}

#[test]
fn conversion_issues_span_the_tag() {
    let input = "Event, Age/abc";
    let root = tokenize(input).unwrap();
    let spec = root.all_tags()[1].clone();
    let d = ParsedHedTag::new(&spec, &SCHEMAS).unwrap_err();
    assert_eq!(d.span, Some(spec.span));
    assert_eq!(&input[spec.span.range()], "Age/abc");
}

#[test]
fn unmatched_schemas() {
    let d = parse_err("sc:Event");
    assert_eq!(d.id, "unmatchedLibrarySchema");
    assert_eq!(d.context_value("library"), Some("sc"));

    let library_only = Schemas::new(IndexMap::from([("sc".to_string(), Arc::clone(&SCHEMA))]));
    let d = parse_with("Event", &library_only).unwrap_err();
    assert_eq!(d.id, "unmatchedBaseSchema");
}

#[test]
fn converter_reports_remainders() {
    let root = tokenize("Age/15").unwrap();
    let spec = root.all_tags()[0].clone();
    let entries = SCHEMA.entries().unwrap();
    let converted = TagConverter::new(&spec, entries).convert().unwrap();
    assert_eq!(converted.remainder, "15");
    assert!(entries.tags().get(converted.tag).is_value_tag());
}

// ─── Comparison and helpers ──────────────────────────────────────────────────

#[test]
fn descendants_and_equivalence() {
    let maglev = parse("Train/Maglev");
    let object = parse("Object");
    assert!(maglev.is_descendant_of(&object));
    assert!(maglev.is_descendant_of(&maglev));
    assert!(!object.is_descendant_of(&maglev));
    assert!(maglev.is_descendant_of_tag("Item/Object/Man-made-object"));
    assert!(!maglev.is_descendant_of_tag("Item/Sound"));

    let short = parse("Train");
    let long = parse("Item/Object/Man-made-object/Vehicle/Train");
    assert!(short.equivalent(&long));
    assert!(!short.equivalent(&object));

    let plain = parse_with("Train", &Schemas::syntax_only()).unwrap();
    assert!(!plain.equivalent(&short));
}

#[test]
fn string_helpers() {
    assert_eq!(ParsedHedTag::tag_name("Item/Object/Car"), "Car");
    assert_eq!(ParsedHedTag::tag_name("Item"), "Item");
    assert_eq!(ParsedHedTag::parent_tag("Item/Object/Car"), "Item/Object");
    assert_eq!(ParsedHedTag::parent_tag("Item"), "Item");
    let ancestors: Vec<&str> = ParsedHedTag::ancestor_iter("a/b/c").collect();
    assert_eq!(ancestors, ["a/b/c", "a/b", "a"]);

    let tag = parse("Train/Maglev");
    assert_eq!(tag.original_tag_name(), "Maglev");
    assert_eq!(
        tag.parent_formatted_tag(),
        "item/object/man-made-object/vehicle/train"
    );
}

#[test]
fn serializes_both_forms() {
    let json = serde_json::to_value(parse("Duration/3 ms")).unwrap();
    assert_eq!(json["tag"], "Duration/3 ms");
    assert_eq!(json["short"], "Duration/3 ms");
    assert_eq!(
        json["long"],
        "Property/Data-property/Data-value/Spatiotemporal-value/Temporal-value/Duration/3 ms"
    );
    assert_eq!(json["value"], "3");
    assert_eq!(json["units"], "ms");
}

// ─── Other generations ───────────────────────────────────────────────────────

#[test]
fn syntax_only_tags_keep_their_text() {
    let tag = parse_with("Train/Maglev", &Schemas::syntax_only()).unwrap();
    assert!(tag.schema().is_none());
    assert_eq!(tag.format(true), "Train/Maglev");
    assert_eq!(tag.formatted_tag(), "train/maglev");
    assert!(!tag.has_attribute("extensionAllowed"));
    assert!(!tag.takes_value());
}

#[test]
fn legacy_tags_use_the_attribute_table() {
    let schema = load_schema_from_str(
        r#"{
            "version": "7.2.0",
            "tagAttributes": {
                "Attribute/Duration/#": { "unitClass": "time" },
                "Event/Label": { "requireChild": true }
            }
        }"#,
    )
    .unwrap();
    let schemas = Schemas::from_base(schema);
    assert_eq!(schemas.generation(), 2);

    let duration = parse_with("Attribute/Duration/3 ms", &schemas).unwrap();
    assert!(duration.takes_value());
    assert_eq!(duration.formatted_tag(), "attribute/duration/3 ms");
    assert_eq!(duration.format(true), "Attribute/Duration/3 ms");
    assert_eq!(duration.value(), None);

    let label = parse_with("Event/Label", &schemas).unwrap();
    assert!(label.has_attribute("requireChild"));
    assert!(!label.takes_value());
}
