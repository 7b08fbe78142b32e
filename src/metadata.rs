//! Service metadata (relational source)
//!
//! Serde model of a CSDL-like metadata document: schemas with entity
//! containers, entity types, complex types and associations.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Parsed service metadata. Accepts both the wrapped
/// `{"dataServices": {"schema": [...]}}` shape and a bare `{"schema": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawServiceMetadata")]
pub struct ServiceMetadata {
    pub schemas: Vec<Schema>,
}

/// Both document shapes. `dataServices` wins when present, so a malformed
/// wrapped document fails instead of falling back to the bare shape.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawServiceMetadata {
    #[serde(default, rename = "dataServices")]
    data_services: Option<DataServices>,
    #[serde(default)]
    schema: Option<Vec<Schema>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct DataServices {
    #[serde(default)]
    schema: Vec<Schema>,
}

impl From<RawServiceMetadata> for ServiceMetadata {
    fn from(raw: RawServiceMetadata) -> Self {
        let schemas = match raw.data_services {
            Some(data_services) => data_services.schema,
            None => raw.schema.unwrap_or_default(),
        };
        Self { schemas }
    }
}

impl ServiceMetadata {
    pub fn new(schemas: Vec<Schema>) -> Self {
        Self { schemas }
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| ModelError::Metadata(format!("Failed to parse service metadata: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Metadata(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ModelError::Metadata(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub namespace: String,
    #[serde(default)]
    pub entity_container: Vec<EntityContainer>,
    #[serde(default)]
    pub entity_type: Vec<StructuredType>,
    #[serde(default)]
    pub complex_type: Vec<StructuredType>,
    #[serde(default)]
    pub association: Vec<Association>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityContainer {
    pub name: String,
    #[serde(default)]
    pub is_default_entity_container: Flag,
    #[serde(default)]
    pub entity_set: Vec<EntitySet>,
}

/// Boolean attribute that metadata parsers emit either as a JSON boolean or
/// as the strings `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Bool(false)
    }
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Flag::Bool(b)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySet {
    pub name: String,
    pub entity_type: String,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

/// Entity types and complex types share this shape; complex types simply
/// leave `key` and `navigation_property` empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredType {
    pub name: String,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub key: Option<Key>,
    #[serde(default)]
    pub property: Vec<RawProperty>,
    #[serde(default)]
    pub navigation_property: Vec<NavigationProperty>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

impl StructuredType {
    /// True if `name` appears in this type's own key declaration.
    pub fn is_key(&self, name: &str) -> bool {
        self.key
            .as_ref()
            .map(|key| key.property_ref.iter().any(|r| r.name == name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    #[serde(default)]
    pub property_ref: Vec<PropertyRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyRef {
    pub name: String,
}

/// A property as declared in the metadata. Every field besides `name`,
/// `type` and `extensions` (precision, nullable, maxLength, ...) lands in
/// `attributes` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub extensions: Vec<Extension>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RawProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_extension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.push(Extension::new(name, value));
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationProperty {
    pub name: String,
    pub relationship: String,
    #[serde(default)]
    pub from_role: Option<String>,
    pub to_role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Association {
    pub name: String,
    #[serde(default)]
    pub end: Vec<AssociationEnd>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociationEnd {
    pub role: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub multiplicity: String,
}

/// A `{name, value}` annotation pair attached to a property, entity set or
/// entity type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Extension {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_and_bare_documents() {
        let schema = json!([{ "namespace": "NS" }]);
        let wrapped: ServiceMetadata =
            serde_json::from_value(json!({ "dataServices": { "schema": schema.clone() } })).unwrap();
        let bare: ServiceMetadata = serde_json::from_value(json!({ "schema": schema })).unwrap();

        assert_eq!(wrapped.schemas.len(), 1);
        assert_eq!(bare.schemas.len(), 1);
        assert_eq!(bare.schemas[0].namespace, "NS");
    }

    #[test]
    fn test_malformed_wrapped_document_is_rejected() {
        // property without a type
        let document = json!({
            "dataServices": {
                "schema": [{
                    "namespace": "NS",
                    "entityType": [{ "name": "Item", "property": [{ "name": "ID" }] }]
                }]
            }
        });

        assert!(serde_json::from_value::<ServiceMetadata>(document.clone()).is_err());
        let err = ServiceMetadata::from_json(&document.to_string()).unwrap_err();
        assert!(matches!(err, ModelError::Metadata(_)));
    }

    #[test]
    fn test_property_attributes_are_collected() {
        let property: RawProperty = serde_json::from_value(json!({
            "name": "Price",
            "type": "Edm.Decimal",
            "precision": "10",
            "scale": "2",
            "nullable": "false",
            "extensions": [{ "name": "label", "value": "Price" }]
        }))
        .unwrap();

        assert_eq!(property.type_name, "Edm.Decimal");
        assert_eq!(property.extensions.len(), 1);
        assert_eq!(property.attributes.len(), 3);
        assert_eq!(property.attributes["precision"], json!("10"));
        assert!(!property.attributes.contains_key("extensions"));
    }

    #[test]
    fn test_default_container_flag() {
        assert!(Flag::Bool(true).is_set());
        assert!(Flag::Text("true".to_string()).is_set());
        assert!(!Flag::Text("false".to_string()).is_set());
        assert!(!Flag::default().is_set());
    }

    #[test]
    fn test_is_key() {
        let entity_type: StructuredType = serde_json::from_value(json!({
            "name": "Product",
            "key": { "propertyRef": [{ "name": "ID" }] },
            "property": [{ "name": "ID", "type": "Edm.Int32" }]
        }))
        .unwrap();

        assert!(entity_type.is_key("ID"));
        assert!(!entity_type.is_key("Name"));
    }
}
