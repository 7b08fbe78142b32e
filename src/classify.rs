//! Classification queries over an assembled model.
//!
//! Every lookup matches names case-insensitively; an unknown name yields the
//! default answer rather than an error.

use crate::model::{Entity, Navigation, Property};
use crate::normalize::CanonicalType;
use serde_json::Value;

pub const MULTIPLICITY_ONE: &str = "1";
pub const MULTIPLICITY_MANY: &str = "*";

fn same_name(a: &str, b: &str) -> bool {
    a.to_uppercase() == b.to_uppercase()
}

fn find_property<'a>(name: &str, properties: &'a [Property]) -> Option<&'a Property> {
    properties.iter().find(|p| same_name(&p.name, name))
}

/// Canonical type of the named property.
pub fn property_type<'a>(name: &str, properties: &'a [Property]) -> Option<&'a str> {
    find_property(name, properties).map(|p| p.remote_type.as_str())
}

fn canonical_type(name: &str, properties: &[Property]) -> Option<CanonicalType> {
    property_type(name, properties).and_then(CanonicalType::parse)
}

/// Whether the named entity is addressable. Entities without an
/// `addressable` annotation are; unknown entities are not.
pub fn is_root_entity(name: &str, entities: &[Entity]) -> bool {
    let Some(entity) = entities.iter().find(|e| same_name(&e.name, name)) else {
        return false;
    };
    match entity.annotations.as_ref().and_then(|a| a.get("addressable")) {
        Some(value) => annotation_flag(value),
        None => true,
    }
}

fn annotation_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.eq_ignore_ascii_case("false"),
        Value::Null => false,
        _ => true,
    }
}

pub fn is_key_property(name: &str, properties: &[Property]) -> bool {
    find_property(name, properties).map(|p| p.is_key).unwrap_or(false)
}

pub fn is_string_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties).map(|t| t.is_string()).unwrap_or(false)
}

pub fn is_date_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties).map(|t| t.is_date()).unwrap_or(false)
}

pub fn is_numeric_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties).map(|t| t.is_numeric()).unwrap_or(false)
}

pub fn is_boolean_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties) == Some(CanonicalType::Boolean)
}

pub fn is_binary_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties).map(|t| t.is_binary()).unwrap_or(false)
}

pub fn is_guid_property(name: &str, properties: &[Property]) -> bool {
    canonical_type(name, properties) == Some(CanonicalType::Uuid)
}

pub fn is_navigations_to_many(name: &str, navigations: &[Navigation]) -> bool {
    is_navigation_by_multiplicity(name, navigations, MULTIPLICITY_MANY)
}

pub fn is_navigations_to_one(name: &str, navigations: &[Navigation]) -> bool {
    is_navigation_by_multiplicity(name, navigations, MULTIPLICITY_ONE)
}

/// Whether the first navigation named `name` has exactly `multiplicity`.
pub fn is_navigation_by_multiplicity(name: &str, navigations: &[Navigation], multiplicity: &str) -> bool {
    navigations
        .iter()
        .find(|n| same_name(&n.name, name))
        .map(|n| n.multiplicity == multiplicity)
        .unwrap_or(false)
}
