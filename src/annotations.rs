//! Annotation merging
//!
//! Extensions arrive as `{name, value}` lists at property, entity-set and
//! entity-type scope. They are folded into ordered maps; when two maps meet,
//! the overlay wins.

use crate::metadata::{EntitySet, Extension, RawProperty, StructuredType};
use serde_json::{Map, Value};

pub type Annotations = Map<String, Value>;

/// Raw property fields that never become attributes.
const RESERVED_PROPERTY_FIELDS: [&str; 3] = ["name", "type", "extensions"];

/// Canonical property fields; attributes with these names would shadow them.
const CANONICAL_PROPERTY_FIELDS: [&str; 3] = ["isKey", "remoteType", "annotations"];

/// Later extensions with the same name overwrite earlier ones.
pub fn from_extensions(extensions: &[Extension]) -> Annotations {
    let mut annotations = Annotations::new();
    for extension in extensions {
        annotations.insert(extension.name.clone(), extension.value.clone());
    }
    annotations
}

/// Copies `base`, then overlays every entry of `overlay`.
pub fn merge(base: &Annotations, overlay: &Annotations) -> Annotations {
    let mut merged = base.clone();
    for (name, value) in overlay {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Entity annotations: entity-type extensions, overridden by entity-set
/// extensions, plus the set's `entityType` identifier.
pub fn entity_annotations(entity_set: &EntitySet, entity_type: &StructuredType) -> Annotations {
    let from_type = from_extensions(&entity_type.extensions);
    let from_set = from_extensions(&entity_set.extensions);
    let mut annotations = merge(&from_type, &from_set);
    annotations.insert(
        "entityType".to_string(),
        Value::String(entity_set.entity_type.clone()),
    );
    annotations
}

/// Every non-reserved field of a raw property, ready to be carried onto the
/// canonical property.
pub fn property_attributes(property: &RawProperty) -> Map<String, Value> {
    property
        .attributes
        .iter()
        .filter(|(name, _)| {
            !RESERVED_PROPERTY_FIELDS.contains(&name.as_str())
                && !CANONICAL_PROPERTY_FIELDS.contains(&name.as_str())
        })
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}
