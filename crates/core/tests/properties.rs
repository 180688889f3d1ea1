//! Property-based tests for the tokenizer and the long/short conversion.

mod common;

use common::SCHEMAS;
use hed_toolchain_core::{SubstringSpec, parse_hed_string, tokenize};
use proptest::prelude::*;

const TAGS: &[&str] = &[
    "Event",
    "Sensory-event",
    "Train/Maglev",
    "Item/Object/Man-made-object/Vehicle/Car",
    "Age/15",
    "RGB-red/0.5",
    "Duration/3 ms",
    "Label/My-label",
    "Def/MyDef/3",
    "Red",
    "Operate",
    "Cost/$ 25.99",
];

/// Comma-separated known tags, some of them wrapped in a group.
fn arb_valid_hed_string() -> impl Strategy<Value = String> {
    prop::collection::vec((prop::sample::select(TAGS), any::<bool>()), 1..8).prop_map(|items| {
        items
            .into_iter()
            .map(|(tag, grouped)| {
                if grouped {
                    format!("({tag})")
                } else {
                    tag.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    })
}

/// Strings over the characters the tokenizer treats specially.
fn arb_delimiter_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(&['(', ')', '{', '}', ',', '/', ':', '#', ' ', 'a', 'B', '~', 'é'][..]),
        0..40,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    /// Issue spans always lie on character boundaries inside the input.
    #[test]
    fn prop_issue_spans_are_valid(input in ".{0,60}") {
        if let Err(issues) = tokenize(&input) {
            prop_assert!(!issues.is_empty());
            for issue in &issues {
                let span = issue.span.unwrap();
                prop_assert!(span.start <= span.end && span.end <= input.len());
                prop_assert!(input.is_char_boundary(span.start));
                prop_assert!(input.is_char_boundary(span.end));
            }
        }
    }

    /// Tags slice back to their own text and are never blank.
    #[test]
    fn prop_tags_slice_back_to_their_text(input in arb_delimiter_soup()) {
        if let Ok(root) = tokenize(&input) {
            for tag in root.all_tags() {
                prop_assert_eq!(tag.text(&input), tag.tag.as_str());
                prop_assert!(!tag.tag.trim().is_empty());
                prop_assert_eq!(tag.tag.trim(), tag.tag.as_str());
            }
            for splice in root.all_column_splices() {
                let text = splice.text(&input);
                prop_assert!(text.starts_with('{') && text.ends_with('}'), "column splice not brace-delimited: {:?}", text);
            }
        }
    }

    /// Known tags always parse, and converting to long form and back gives
    /// the same short form.
    #[test]
    fn prop_long_short_round_trip(input in arb_valid_hed_string()) {
        let parsed = parse_hed_string(&input, &SCHEMAS);
        prop_assert!(parsed.is_ok(), "{:?}", parsed.issues());
        let long = parsed.format(true);
        let reparsed = parse_hed_string(&long, &SCHEMAS);
        prop_assert!(reparsed.is_ok(), "{:?}", reparsed.issues());
        prop_assert_eq!(reparsed.format(false), parsed.format(false));
        prop_assert_eq!(reparsed.format(true), long);
    }
}
