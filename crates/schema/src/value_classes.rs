//! Value classes: the character and word-form rules a tag value must meet.

use regex::Regex;

use crate::entries::{Attributes, SchemaEntry};
use crate::error::SchemaError;

const NUMERIC_WORD: &str = r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$";
const DATE_TIME_WORD: &str = r"^\d{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12]\d|3[01])(?:T(?:[01]\d|2[0-3]):[0-5]\d(?::[0-5]\d(?:\.\d+)?)?(?:Z|[+-](?:[01]\d|2[0-3]):[0-5]\d)?)?$";
const ANY_WORD: &str = r"^(?s:.*)$";

/// A value class with compiled matchers.
#[derive(Debug, Clone)]
pub struct SchemaValueClass {
    name: String,
    attributes: Attributes,
    char_class: Regex,
    word_form: Regex,
}

impl SchemaValueClass {
    /// Compile the class from its `allowedCharacter` attribute and word form.
    ///
    /// `word_pattern` overrides the built-in word form for this class name.
    pub fn new(
        name: impl Into<String>,
        attributes: Attributes,
        word_pattern: Option<&str>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| SchemaError::InvalidValueClassPattern {
                name: name.clone(),
                source,
            })
        };
        let char_class = compile(&char_class_pattern(
            attributes.attribute_values("allowedCharacter"),
        ))?;
        let word_form = compile(word_pattern.unwrap_or_else(|| default_word_pattern(&name)))?;
        Ok(Self {
            name,
            attributes,
            char_class,
            word_form,
        })
    }

    /// Whether every character of `value` is allowed.
    pub fn matches_char_class(&self, value: &str) -> bool {
        self.char_class.is_match(value)
    }

    /// Whether `value` is a valid member of this class.
    pub fn validate_value(&self, value: &str) -> bool {
        self.word_form.is_match(value) && self.char_class.is_match(value)
    }
}

impl SchemaEntry for SchemaValueClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

fn default_word_pattern(class: &str) -> &'static str {
    match class {
        "numericClass" => NUMERIC_WORD,
        "dateTimeClass" => DATE_TIME_WORD,
        _ => ANY_WORD,
    }
}

/// Regex accepting strings made only of the allowed characters.
fn char_class_pattern(allowed: &[String]) -> String {
    if allowed.is_empty() {
        return ANY_WORD.to_string();
    }
    let mut class = String::new();
    for entry in allowed {
        match entry.as_str() {
            "letters" => class.push_str(r"\p{L}"),
            "digits" => class.push_str("0-9"),
            "blank" => class.push(' '),
            "alphanumeric" => class.push_str(r"\p{L}0-9"),
            "nonascii" => class.push_str(r"\x{80}-\x{10FFFF}"),
            "text" => class.push_str(r"\P{Cc}"),
            literal => {
                for c in literal.chars() {
                    class.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                }
            }
        }
    }
    format!("^[{class}]*$")
}
