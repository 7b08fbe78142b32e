//! Canonical data source model
//!
//! The flattened entity/property/navigation document handed to downstream
//! template logic. Navigations refer to their target by position:
//! `@datasource.entities.<index>.elements`.

use crate::annotations::Annotations;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const REFERENCE_PREFIX: &str = "@datasource.entities.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSourceModel {
    pub entities: Vec<Entity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub elements: Vec<Property>,
    #[serde(default)]
    pub navigations: Vec<Navigation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    pub is_key: bool,
    /// Verbatim source type tag; only the relational source has one.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    pub remote_type: String,
    #[serde(default)]
    pub annotations: Annotations,
    /// Extra source attributes (precision, nullable, maxLength, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Navigation {
    pub name: String,
    pub multiplicity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigations: Option<String>,
}

impl Navigation {
    /// A navigation pointing at the entity stored at `index`.
    pub fn resolved(name: impl Into<String>, multiplicity: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            multiplicity: multiplicity.into(),
            elements: Some(reference(index, ReferenceKind::Elements)),
            navigations: Some(reference(index, ReferenceKind::Navigations)),
        }
    }

    /// A navigation whose target could not be matched.
    pub fn dangling(name: impl Into<String>, multiplicity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiplicity: multiplicity.into(),
            elements: None,
            navigations: None,
        }
    }

    /// Index of the referenced entity, if this navigation is resolved.
    pub fn target_index(&self) -> Option<usize> {
        self.elements
            .as_deref()
            .and_then(parse_reference)
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Elements,
    Navigations,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Elements => "elements",
            ReferenceKind::Navigations => "navigations",
        }
    }
}

/// Builds `@datasource.entities.<index>.<kind>`.
pub fn reference(index: usize, kind: ReferenceKind) -> String {
    format!("{}{}.{}", REFERENCE_PREFIX, index, kind.as_str())
}

/// Splits a reference path back into its entity index and member kind.
pub fn parse_reference(path: &str) -> Option<(usize, ReferenceKind)> {
    let rest = path.strip_prefix(REFERENCE_PREFIX)?;
    let (index, kind) = rest.split_once('.')?;
    let index = index.parse().ok()?;
    let kind = match kind {
        "elements" => ReferenceKind::Elements,
        "navigations" => ReferenceKind::Navigations,
        _ => return None,
    };
    Some((index, kind))
}

/// Target of a reference path within a finished model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Referenced<'a> {
    Elements(&'a [Property]),
    Navigations(&'a [Navigation]),
}

impl DataSourceModel {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Resolves a `@datasource.entities.<i>.*` path against this model.
    pub fn resolve_reference(&self, path: &str) -> Option<Referenced<'_>> {
        let (index, kind) = parse_reference(path)?;
        let entity = self.entities.get(index)?;
        Some(match kind {
            ReferenceKind::Elements => Referenced::Elements(&entity.elements),
            ReferenceKind::Navigations => Referenced::Navigations(&entity.navigations),
        })
    }

    /// Entity a navigation points to, if it is resolved.
    pub fn navigation_target(&self, navigation: &Navigation) -> Option<&Entity> {
        navigation.target_index().and_then(|i| self.entities.get(i))
    }
}
