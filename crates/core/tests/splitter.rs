mod common;

use common::{LIBRARY_SCHEMAS, SCHEMAS, diag_codes};
use hed_toolchain_core::{ParsedHedSubstring, parse_hed_string, split_hed_string};
use hed_toolchain_schema::Schemas;

#[test]
fn converts_between_long_and_short_forms() {
    let parsed = parse_hed_string("(Train/Maglev,Age/15,RGB-red/0.5),Operate", &SCHEMAS);
    assert!(parsed.is_ok(), "{:?}", parsed.issues());
    assert_eq!(
        parsed.format(true),
        "(Item/Object/Man-made-object/Vehicle/Train/Maglev, \
         Property/Agent-property/Agent-trait/Age/15, \
         Property/Sensory-property/Sensory-attribute/Visual-attribute/Color/RGB-color/RGB-red/0.5), \
         Action/Perform/Operate"
    );
    assert_eq!(
        parsed.format(false),
        "(Train/Maglev, Age/15, RGB-red/0.5), Operate"
    );

    let long = parse_hed_string(&parsed.format(true), &SCHEMAS);
    assert_eq!(long.format(false), parsed.format(false));
}

#[test]
fn tree_shape() {
    let parsed = parse_hed_string("Event, (Label/#, (Red, {b})), {a}", &SCHEMAS);
    assert!(parsed.is_ok());
    assert_eq!(parsed.tree().len(), 3);

    let top: Vec<&str> = parsed.top_level_tags().map(|t| t.original_tag()).collect();
    assert_eq!(top, ["Event"]);

    let group = parsed.tag_groups().next().unwrap();
    assert_eq!(group.original_text(), "(Label/#, (Red, {b}))");
    assert_eq!(group.to_string(), "(Label/#, (Red, {b}))");
    assert_eq!(group.tags().count(), 1);
    let inner = group.subgroups().next().unwrap();
    assert_eq!(inner.column_splices().next().unwrap().column_name(), "b");
    let all: Vec<&str> = group.all_tags().iter().map(|t| t.original_tag()).collect();
    assert_eq!(all, ["Label/#", "Red"]);

    let tags: Vec<&str> = parsed.tags().iter().map(|t| t.original_tag()).collect();
    assert_eq!(tags, ["Event", "Label/#", "Red"]);
    let splices: Vec<String> = parsed.column_splices().iter().map(|s| s.format()).collect();
    assert_eq!(splices, ["{b}", "{a}"]);
    assert_eq!(parsed.format(false), "Event, (Label/#, (Red, {b})), {a}");
}

#[test]
fn failed_tags_are_left_out() {
    let result = split_hed_string("Event, Junk, (Age/abc, Red), Item/Train", &SCHEMAS);
    assert!(result.issues.syntax.is_empty());
    assert_eq!(
        diag_codes(&result.issues.conversion),
        ["invalidTag", "invalidValue", "invalidParentNode"]
    );
    let tree = result.tree.unwrap();
    assert_eq!(tree.len(), 2);
    let ParsedHedSubstring::Group(group) = &tree[1] else {
        panic!("expected a group, got {:?}", tree[1]);
    };
    let names: Vec<&str> = group.tags().map(|t| t.original_tag()).collect();
    assert_eq!(names, ["Red"]);
    assert!(result.issues.has_errors());
}

#[test]
fn syntax_issues_leave_no_tree() {
    let result = split_hed_string("Event,,Red", &SCHEMAS);
    assert!(result.tree.is_none());
    assert_eq!(diag_codes(&result.issues.syntax), ["emptyTagFound"]);
    assert!(result.issues.conversion.is_empty());

    let parsed = parse_hed_string("(Event", &SCHEMAS);
    assert!(parsed.tree().is_empty());
    assert!(!parsed.is_ok());
}

#[test]
fn syntax_only_collections_skip_resolution() {
    let parsed = parse_hed_string("Junk/Stuff, (Whatever)", &Schemas::syntax_only());
    assert!(parsed.is_ok());
    assert_eq!(parsed.format(true), "Junk/Stuff, (Whatever)");
}

#[test]
fn library_tags_keep_their_prefix() {
    let parsed = parse_hed_string("sc:Train, Red", &LIBRARY_SCHEMAS);
    assert!(parsed.is_ok());
    assert_eq!(
        parsed.format(true),
        "sc:Item/Object/Man-made-object/Vehicle/Train, \
         Property/Sensory-property/Sensory-attribute/Visual-attribute/Color/CSS-color/Red-color/Red"
    );

    let parsed = parse_hed_string("la:Train", &LIBRARY_SCHEMAS);
    assert_eq!(
        diag_codes(&parsed.issues().conversion),
        ["unmatchedLibrarySchema"]
    );
}

#[test]
fn serializes_tree_and_issues() {
    let parsed = parse_hed_string("Event, (Junk)", &SCHEMAS);
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["tree"][0]["kind"], "tag");
    assert_eq!(json["tree"][0]["long"], "Event");
    assert_eq!(json["tree"][1]["kind"], "group");
    assert_eq!(json["tree"][1]["children"].as_array().unwrap().len(), 0);
    assert_eq!(json["issues"]["conversion"][0]["id"], "invalidTag");
}
