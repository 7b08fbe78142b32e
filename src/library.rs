//! Object library (tree source)
//!
//! Hierarchical schema: nested contexts holding entities whose elements are
//! either simple typed members or associations to other entities. The nested
//! JSON form is flattened into an index-addressed arena on load so traversal
//! never recurses over the input.

use crate::error::{ModelError, Result};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Index of a context inside an [`ObjectLibrary`]. Only handed out by
/// [`ObjectLibrary::add_context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(usize);

#[derive(Debug, Clone, Default)]
pub struct ObjectLibrary {
    contexts: Vec<ContextNode>,
    roots: Vec<ContextId>,
}

#[derive(Debug, Clone)]
pub struct ContextNode {
    pub name: String,
    pub children: Vec<ContextId>,
    pub entities: Vec<LibraryEntity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntity {
    pub name: String,
    #[serde(default)]
    pub fully_qualified_name: Option<String>,
    #[serde(default)]
    pub annotations: Option<Map<String, Value>>,
    #[serde(default)]
    pub elements: Vec<LibraryElement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryElement {
    pub name: String,
    #[serde(default)]
    pub is_key: bool,
    #[serde(default)]
    pub annotations: Map<String, Value>,
    #[serde(rename = "type")]
    pub element_type: ElementType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ElementType {
    /// A scalar member; `name` is already a canonical type name.
    Simple { name: String },
    #[serde(rename_all = "camelCase")]
    Association {
        cardinality: Cardinality,
        #[serde(default)]
        target_entity: Option<String>,
    },
}

impl ElementType {
    pub fn is_association(&self) -> bool {
        matches!(self, ElementType::Association { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cardinality {
    #[serde(default)]
    pub lower_bound: u32,
    /// `None` means unbounded. Accepts `null`, a negative count or `"*"`
    /// for that.
    #[serde(default, deserialize_with = "deserialize_upper_bound")]
    pub upper_bound: Option<u32>,
}

impl Cardinality {
    pub fn is_to_one(&self) -> bool {
        self.upper_bound == Some(1)
    }
}

fn deserialize_upper_bound<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBound {
        Count(i64),
        Text(String),
    }

    match Option::<RawBound>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawBound::Count(n)) if n < 0 => Ok(None),
        Some(RawBound::Count(n)) => u32::try_from(n).map(Some).map_err(de::Error::custom),
        Some(RawBound::Text(text)) => match text.trim() {
            "*" | "n" | "N" | "-1" => Ok(None),
            bound => bound
                .parse::<u32>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid upper bound '{}'", text))),
        },
    }
}

/// Nested JSON representation of a context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextJson {
    pub name: String,
    #[serde(default)]
    pub contexts: Vec<ContextJson>,
    #[serde(default)]
    pub entities: Vec<LibraryEntity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectLibraryJson {
    pub roots: Vec<ContextJson>,
}

impl ObjectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let library_json: ObjectLibraryJson = serde_json::from_str(json_str)
            .map_err(|e| ModelError::Metadata(format!("Failed to parse object library: {}", e)))?;
        Self::from_roots(library_json.roots)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Metadata(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Flattens nested contexts into the arena. Child ids are assigned in
    /// declaration order.
    pub fn from_roots(roots: Vec<ContextJson>) -> Result<Self> {
        let mut library = Self::new();
        let mut pending: Vec<(Option<ContextId>, ContextJson)> =
            roots.into_iter().rev().map(|root| (None, root)).collect();

        while let Some((parent, context)) = pending.pop() {
            let id = library.add_context(parent, context.name, context.entities)?;
            for child in context.contexts.into_iter().rev() {
                pending.push((Some(id), child));
            }
        }
        Ok(library)
    }

    /// Adds a context under `parent`, or as a new root when `parent` is `None`.
    /// Fails when `parent` does not belong to this library.
    pub fn add_context(
        &mut self,
        parent: Option<ContextId>,
        name: impl Into<String>,
        entities: Vec<LibraryEntity>,
    ) -> Result<ContextId> {
        let id = ContextId(self.contexts.len());
        match parent {
            Some(parent) => self
                .contexts
                .get_mut(parent.0)
                .ok_or_else(|| ModelError::Metadata(format!("Unknown parent context {}", parent.0)))?
                .children
                .push(id),
            None => self.roots.push(id),
        }
        self.contexts.push(ContextNode {
            name: name.into(),
            children: Vec::new(),
            entities,
        });
        Ok(id)
    }

    pub fn roots(&self) -> &[ContextId] {
        &self.roots
    }

    pub fn context(&self, id: ContextId) -> Option<&ContextNode> {
        self.contexts.get(id.0)
    }

    /// Child contexts of `id`; empty for an id from another library.
    pub fn nested_contexts(&self, id: ContextId) -> &[ContextId] {
        self.context(id).map_or(&[], |node| node.children.as_slice())
    }

    pub fn nested_entities(&self, id: ContextId) -> &[LibraryEntity] {
        self.context(id).map_or(&[], |node| node.entities.as_slice())
    }

    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}

impl LibraryEntity {
    pub fn new(name: impl Into<String>, fully_qualified_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fully_qualified_name: Some(fully_qualified_name.into()),
            annotations: None,
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: LibraryElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }
}

impl LibraryElement {
    pub fn simple(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_key: false,
            annotations: Map::new(),
            element_type: ElementType::Simple {
                name: type_name.into(),
            },
        }
    }

    pub fn association(
        name: impl Into<String>,
        upper_bound: Option<u32>,
        target_entity: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            is_key: false,
            annotations: Map::new(),
            element_type: ElementType::Association {
                cardinality: Cardinality {
                    lower_bound: 0,
                    upper_bound,
                },
                target_entity: target_entity.map(str::to_string),
            },
        }
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_builds_arena() {
        let library = ObjectLibrary::from_json(
            &json!({
                "roots": [{
                    "name": "root",
                    "contexts": [
                        { "name": "a", "contexts": [{ "name": "a1" }] },
                        { "name": "b", "entities": [{ "name": "B1" }] }
                    ]
                }]
            })
            .to_string(),
        )
        .unwrap();

        assert_eq!(library.context_count(), 4);
        assert_eq!(library.roots().len(), 1);

        let root = library.roots()[0];
        let children = library.nested_contexts(root);
        assert_eq!(children.len(), 2);
        assert_eq!(library.context(children[0]).unwrap().name, "a");
        assert_eq!(library.context(children[1]).unwrap().name, "b");
        assert_eq!(library.nested_entities(children[1])[0].name, "B1");
        assert_eq!(library.context(library.nested_contexts(children[0])[0]).unwrap().name, "a1");
    }

    #[test]
    fn test_element_type_tags() {
        let element: LibraryElement = serde_json::from_value(json!({
            "name": "orders",
            "type": {
                "kind": "association",
                "cardinality": { "lowerBound": 0, "upperBound": null },
                "targetEntity": "shop.Order"
            }
        }))
        .unwrap();

        assert!(element.element_type.is_association());
        assert!(!element.is_key);

        let simple: LibraryElement = serde_json::from_value(json!({
            "name": "id",
            "isKey": true,
            "type": { "kind": "simple", "name": "Integer" }
        }))
        .unwrap();
        assert_eq!(simple.element_type, ElementType::Simple { name: "Integer".to_string() });
        assert!(simple.is_key);
    }

    #[test]
    fn test_foreign_context_ids_do_not_panic() {
        let mut small = ObjectLibrary::new();
        small.add_context(None, "root", Vec::new()).unwrap();

        let mut large = ObjectLibrary::new();
        let root = large.add_context(None, "root", Vec::new()).unwrap();
        let foreign = large.add_context(Some(root), "child", Vec::new()).unwrap();

        assert!(small.context(foreign).is_none());
        assert!(small.nested_contexts(foreign).is_empty());
        assert!(small.nested_entities(foreign).is_empty());

        let err = small.add_context(Some(foreign), "orphan", Vec::new()).unwrap_err();
        assert!(matches!(err, ModelError::Metadata(_)));
        assert_eq!(small.context_count(), 1);
    }

    #[test]
    fn test_unbounded_upper_bound_spellings() {
        let bound = |value: Value| -> Option<u32> {
            serde_json::from_value::<Cardinality>(json!({ "lowerBound": 0, "upperBound": value }))
                .unwrap()
                .upper_bound
        };

        assert_eq!(bound(json!(null)), None);
        assert_eq!(bound(json!(-1)), None);
        assert_eq!(bound(json!("*")), None);
        assert_eq!(bound(json!(1)), Some(1));
        assert_eq!(bound(json!("1")), Some(1));
        assert_eq!(bound(json!(5)), Some(5));

        let missing: Cardinality = serde_json::from_value(json!({ "lowerBound": 1 })).unwrap();
        assert_eq!(missing.upper_bound, None);
        assert!(!missing.is_to_one());

        assert!(serde_json::from_value::<Cardinality>(json!({ "upperBound": "many" })).is_err());
    }
}
