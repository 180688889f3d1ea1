//! Units, unit classes and unit extraction from tag values.

use crate::entries::{Attributes, EntryManager, SchemaEntry, SchemaUnitModifier};

/// A unit of a unit class.
#[derive(Debug, Clone)]
pub struct SchemaUnit {
    name: String,
    attributes: Attributes,
    derivative_units: Vec<String>,
}

impl SchemaUnit {
    /// Build a unit and compute every spelling it accepts.
    pub fn new(
        name: impl Into<String>,
        attributes: Attributes,
        modifiers: &EntryManager<SchemaUnitModifier>,
    ) -> Self {
        let mut unit = Self {
            name: name.into(),
            attributes,
            derivative_units: Vec::new(),
        };
        unit.derivative_units = unit.compute_derivatives(modifiers);
        unit
    }

    fn compute_derivatives(&self, modifiers: &EntryManager<SchemaUnitModifier>) -> Vec<String> {
        let name = self.name.clone();
        if !self.is_si_unit() {
            if self.is_unit_symbol() {
                return vec![name];
            }
            let plural = pluralize(&name);
            return vec![name, plural];
        }
        if self.is_unit_symbol() {
            let mut derivatives = vec![name];
            derivatives.extend(
                modifiers
                    .entries_with_boolean_attribute("SIUnitSymbolModifier")
                    .map(|modifier| format!("{}{}", modifier.name(), self.name)),
            );
            return derivatives;
        }
        let plural = pluralize(&name);
        let mut derivatives = vec![name, plural.clone()];
        for modifier in modifiers.entries_with_boolean_attribute("SIUnitModifier") {
            derivatives.push(format!("{}{}", modifier.name(), self.name));
            derivatives.push(format!("{}{plural}", modifier.name()));
        }
        derivatives
    }

    /// Every spelling of this unit: plural and SI-prefixed forms included.
    pub fn derivative_units(&self) -> &[String] {
        &self.derivative_units
    }

    /// Whether the unit is written before the value (`$10`).
    pub fn is_prefix_unit(&self) -> bool {
        self.has_boolean_attribute("unitPrefix")
    }

    /// Whether the unit takes SI modifiers.
    pub fn is_si_unit(&self) -> bool {
        self.has_boolean_attribute("SIUnit")
    }

    /// Whether the unit is a symbol (`s`) rather than a word (`second`).
    pub fn is_unit_symbol(&self) -> bool {
        self.has_boolean_attribute("unitSymbol")
    }

    /// Whether `text` is written in this unit.
    ///
    /// Prefix units only need to start `text`; other units must equal one
    /// of the derivative spellings.
    pub fn validate_unit(&self, text: &str) -> bool {
        if self.is_prefix_unit() {
            return text.starts_with(&self.name);
        }
        self.derivative_units.iter().any(|unit| unit == text)
    }
}

impl SchemaEntry for SchemaUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// Result of splitting a tag value into a number and a unit.
#[derive(Debug, Clone, Copy)]
pub struct ExtractedUnit<'u, 'v> {
    /// The unit that matched.
    pub unit: Option<&'u SchemaUnit>,
    /// The text that was taken as the unit. Set without `unit` when the
    /// value has a unit part that no unit of the class accepts.
    pub unit_string: Option<&'v str>,
    /// The value with the unit removed.
    pub value: &'v str,
}

/// A unit class and its units.
#[derive(Debug, Clone)]
pub struct SchemaUnitClass {
    name: String,
    attributes: Attributes,
    units: EntryManager<SchemaUnit>,
}

impl SchemaUnitClass {
    /// Unit class with the given units.
    pub fn new(
        name: impl Into<String>,
        attributes: Attributes,
        units: EntryManager<SchemaUnit>,
    ) -> Self {
        Self {
            name: name.into(),
            attributes,
            units,
        }
    }

    /// Units in declaration order.
    pub fn units(&self) -> &EntryManager<SchemaUnit> {
        &self.units
    }

    /// The unit named by the `defaultUnits` attribute.
    pub fn default_unit(&self) -> Option<&SchemaUnit> {
        self.attribute_value("defaultUnits")
            .and_then(|name| self.units.get_entry(name))
    }

    /// Split `value` at its first blank and find the unit it is written in.
    ///
    /// Without a blank there is nothing to split. Otherwise units are tried
    /// in order: ordinary units must match the text after the blank, prefix
    /// units the text before it.
    pub fn extract_unit<'a, 'v>(&'a self, value: &'v str) -> ExtractedUnit<'a, 'v> {
        let Some((before_blank, after_blank)) = value.split_once(' ') else {
            return ExtractedUnit {
                unit: None,
                unit_string: None,
                value,
            };
        };
        for unit in self.units.iter() {
            if !unit.is_prefix_unit() && unit.validate_unit(after_blank) {
                return ExtractedUnit {
                    unit: Some(unit),
                    unit_string: Some(after_blank),
                    value: before_blank,
                };
            }
            if !unit.is_prefix_unit() || !unit.validate_unit(before_blank) {
                continue;
            }
            // The prefix is skipped together with the one character after it.
            let prefix_len = unit.name.len();
            if let (Some(unit_string), Some(rest)) =
                (value.get(..prefix_len), value.get(prefix_len + 1..))
            {
                return ExtractedUnit {
                    unit: Some(unit),
                    unit_string: Some(unit_string),
                    value: rest,
                };
            }
        }
        ExtractedUnit {
            unit: None,
            unit_string: Some(after_blank),
            value: before_blank,
        }
    }
}

impl SchemaEntry for SchemaUnitClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

const UNCOUNTABLE: &[&str] = &["hertz", "siemens", "lux"];

/// English plural of a unit name.
pub fn pluralize(word: &str) -> String {
    if UNCOUNTABLE.contains(&word.to_lowercase().as_str()) {
        return word.to_string();
    }
    if word == "foot" {
        return "feet".to_string();
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    match word.strip_suffix('y') {
        Some(stem)
            if stem
                .chars()
                .last()
                .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiouAEIOU".contains(c)) =>
        {
            format!("{stem}ies")
        }
        _ => format!("{word}s"),
    }
}
