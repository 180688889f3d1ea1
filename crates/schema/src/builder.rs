//! Builds [`SchemaEntries`] from a HED-3 schema document.

use log::debug;

use crate::entries::{
    Attributes, EntryManager, SchemaAttribute, SchemaEntries, SchemaEntry, SchemaProperty,
    SchemaUnitModifier,
};
use crate::error::SchemaError;
use crate::source::{SchemaSource, TagSource};
use crate::special::SpecialTags;
use crate::tags::{TagId, TagManager};
use crate::units::{SchemaUnit, SchemaUnitClass};
use crate::value_classes::SchemaValueClass;

pub(crate) fn build_entries(source: &SchemaSource) -> Result<SchemaEntries, SchemaError> {
    let mut properties = EntryManager::new("property");
    for property in &source.properties {
        properties.insert(SchemaProperty::new(&property.name))?;
    }

    let mut attributes = EntryManager::new("attribute");
    for attribute in &source.attributes {
        attributes.insert(SchemaAttribute::new(
            &attribute.name,
            attribute.properties.iter().cloned(),
        ))?;
    }

    let mut unit_modifiers = EntryManager::case_sensitive("unit modifier");
    for modifier in &source.unit_modifiers {
        unit_modifiers.insert(SchemaUnitModifier::new(
            &modifier.name,
            Attributes::from_source(&modifier.attributes),
        ))?;
    }

    let mut unit_classes = EntryManager::new("unit class");
    for class in &source.unit_classes {
        let mut units = EntryManager::case_sensitive("unit");
        for unit in &class.units {
            units.insert(SchemaUnit::new(
                &unit.name,
                Attributes::from_source(&unit.attributes),
                &unit_modifiers,
            ))?;
        }
        unit_classes.insert(SchemaUnitClass::new(
            &class.name,
            Attributes::from_source(&class.attributes),
            units,
        ))?;
    }

    let mut value_classes = EntryManager::new("value class");
    for class in &source.value_classes {
        value_classes.insert(SchemaValueClass::new(
            &class.name,
            Attributes::from_source(&class.attributes),
            class.word_pattern.as_deref(),
        )?)?;
    }

    let mut tags = TagManager::default();
    for tag in &source.tags {
        add_tag(&mut tags, tag, None)?;
    }

    for (_, tag) in tags.iter() {
        for unit_class in tag.unit_class_names() {
            if !unit_classes.has_entry(unit_class) {
                return Err(SchemaError::UnknownUnitClass {
                    tag: tag.long_name().to_string(),
                    unit_class: unit_class.clone(),
                });
            }
        }
        for value_class in tag.value_class_names() {
            if !value_classes.has_entry(value_class) {
                return Err(SchemaError::UnknownValueClass {
                    tag: tag.long_name().to_string(),
                    value_class: value_class.clone(),
                });
            }
        }
    }

    inherit_attributes(&mut tags, &attributes);

    debug!(
        "built schema version {} (library '{}'): {} tags, {} unit classes, {} value classes",
        source.version,
        source.library,
        tags.len(),
        unit_classes.len(),
        value_classes.len()
    );

    Ok(SchemaEntries {
        properties,
        attributes,
        unit_modifiers,
        unit_classes,
        value_classes,
        tags,
        special: SpecialTags::from_source(source.special.as_ref()),
    })
}

fn add_tag(
    tags: &mut TagManager,
    source: &TagSource,
    parent: Option<TagId>,
) -> Result<(), SchemaError> {
    let id = tags.push(
        &source.name,
        Attributes::from_source(&source.attributes),
        parent,
    )?;
    for child in &source.children {
        add_tag(tags, child, Some(id))?;
    }
    Ok(())
}

/// Copy inherited attributes down the hierarchy. Value tags are skipped.
///
/// Relies on the arena holding parents before their children.
fn inherit_attributes(tags: &mut TagManager, attributes: &EntryManager<SchemaAttribute>) {
    let inherited: Vec<String> = attributes
        .iter()
        .filter(|attribute| attribute.is_inherited())
        .map(|attribute| attribute.name().to_string())
        .collect();
    if inherited.is_empty() {
        return;
    }
    let ids: Vec<TagId> = tags.iter().map(|(id, _)| id).collect();
    for id in ids {
        let tag = tags.get(id);
        let Some(parent) = tag.parent() else {
            continue;
        };
        if tag.is_value_tag() {
            continue;
        }
        let missing: Vec<String> = inherited
            .iter()
            .filter(|name| tags.get(parent).has_attribute(name) && !tag.has_attribute(name))
            .cloned()
            .collect();
        let own = tags.attributes_mut(id);
        for name in &missing {
            own.insert_boolean(name);
        }
    }
}
