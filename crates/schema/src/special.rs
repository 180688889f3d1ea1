use std::collections::BTreeSet;

use crate::source::SpecialSource;

const DEFAULT_REQUIRE_VALUE: &[&str] = &["Def", "Def-expand"];
const DEFAULT_TWO_LEVEL_VALUE: &[&str] = &["Def", "Def-expand", "Definition"];

/// Tag names that get special value handling.
///
/// Names are compared case-insensitively against the parent of a value tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTags {
    require_value: BTreeSet<String>,
    two_level_value: BTreeSet<String>,
}

impl SpecialTags {
    /// Take the sets from a schema document, falling back to the HED-3
    /// defaults for each set the document leaves empty.
    pub fn from_source(source: Option<&SpecialSource>) -> Self {
        let pick = |given: Option<&Vec<String>>, default: &[&str]| -> BTreeSet<String> {
            match given {
                Some(names) if !names.is_empty() => {
                    names.iter().map(|name| name.to_lowercase()).collect()
                }
                _ => default.iter().map(|name| name.to_lowercase()).collect(),
            }
        };
        Self {
            require_value: pick(
                source.map(|s| &s.require_value_tags),
                DEFAULT_REQUIRE_VALUE,
            ),
            two_level_value: pick(
                source.map(|s| &s.allow_two_level_value_tags),
                DEFAULT_TWO_LEVEL_VALUE,
            ),
        }
    }

    /// Whether the value tag under `tag_name` must always be filled.
    pub fn requires_value(&self, tag_name: &str) -> bool {
        self.require_value.contains(&tag_name.to_lowercase())
    }

    /// Whether the value under `tag_name` may hold a second `/` level.
    pub fn allows_two_level_value(&self, tag_name: &str) -> bool {
        self.two_level_value.contains(&tag_name.to_lowercase())
    }
}

impl Default for SpecialTags {
    fn default() -> Self {
        Self::from_source(None)
    }
}
