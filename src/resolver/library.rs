//! Object library resolution
//!
//! Entities are gathered from the first root's child contexts, descendants
//! before each context's own entities. Association elements become
//! navigations; a target that is not in the entity list leaves the
//! navigation without references.

use crate::library::{ContextId, ElementType, LibraryElement, LibraryEntity, ObjectLibrary};
use crate::model::{Entity, Navigation, Property};
use serde_json::Value;
use tracing::warn;

pub struct LibraryResolver<'a> {
    library: &'a ObjectLibrary,
}

impl<'a> LibraryResolver<'a> {
    pub fn new(library: &'a ObjectLibrary) -> Self {
        Self { library }
    }

    pub fn resolve(&self) -> Vec<Entity> {
        let sources = self.collect_entities();
        let mut entities: Vec<Entity> = sources.iter().map(|e| self.resolve_entity(e)).collect();

        let navigations: Vec<Vec<Navigation>> = sources
            .iter()
            .map(|e| self.resolve_navigations(&e.elements, &entities))
            .collect();

        for (entity, navigations) in entities.iter_mut().zip(navigations) {
            entity.navigations = navigations;
        }
        entities
    }

    /// Every entity below the first root, in traversal order.
    pub fn collect_entities(&self) -> Vec<&'a LibraryEntity> {
        let mut entities = Vec::new();
        let Some(&root) = self.library.roots().first() else {
            return entities;
        };

        // (context, children already pushed)
        let mut stack: Vec<(ContextId, bool)> = self
            .library
            .nested_contexts(root)
            .iter()
            .rev()
            .map(|&id| (id, false))
            .collect();

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                entities.extend(self.library.nested_entities(id));
                continue;
            }
            stack.push((id, true));
            for &child in self.library.nested_contexts(id).iter().rev() {
                stack.push((child, false));
            }
        }

        entities
    }

    fn resolve_entity(&self, source: &LibraryEntity) -> Entity {
        let entity_type = source
            .annotations
            .as_ref()
            .and_then(|a| a.get("entityType"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Entity {
            name: source.name.clone(),
            entity_type,
            fully_qualified_name: source.fully_qualified_name.clone(),
            elements: source.elements.iter().filter_map(property).collect(),
            navigations: Vec::new(),
            annotations: source.annotations.clone(),
        }
    }

    fn resolve_navigations(&self, elements: &[LibraryElement], entities: &[Entity]) -> Vec<Navigation> {
        elements
            .iter()
            .filter_map(|element| match &element.element_type {
                ElementType::Association {
                    cardinality,
                    target_entity,
                } => {
                    let multiplicity = if cardinality.is_to_one() { "1" } else { "*" };
                    let index = target_entity
                        .as_deref()
                        .and_then(|target| position_by_qualified_name(entities, target));
                    Some(match index {
                        Some(index) => Navigation::resolved(element.name.clone(), multiplicity, index),
                        None => {
                            warn!(
                                "Navigation {} has no resolvable target ({:?})",
                                element.name, target_entity
                            );
                            Navigation::dangling(element.name.clone(), multiplicity)
                        }
                    })
                }
                ElementType::Simple { .. } => None,
            })
            .collect()
    }
}

fn property(element: &LibraryElement) -> Option<Property> {
    match &element.element_type {
        ElementType::Simple { name } => Some(Property {
            name: element.name.clone(),
            is_key: element.is_key,
            source_type: None,
            remote_type: name.clone(),
            annotations: element.annotations.clone(),
            attributes: Default::default(),
        }),
        ElementType::Association { .. } => None,
    }
}

fn position_by_qualified_name(entities: &[Entity], qualified_name: &str) -> Option<usize> {
    entities
        .iter()
        .position(|e| e.fully_qualified_name.as_deref() == Some(qualified_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{ContextJson, LibraryElement, LibraryEntity};

    fn context(name: &str, contexts: Vec<ContextJson>, entities: &[&str]) -> ContextJson {
        ContextJson {
            name: name.to_string(),
            contexts,
            entities: entities
                .iter()
                .map(|e| LibraryEntity::new(*e, format!("lib.{}", e)))
                .collect(),
        }
    }

    fn names(entities: &[&LibraryEntity]) -> Vec<String> {
        entities.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_descendants_precede_own_entities() {
        let library = ObjectLibrary::from_roots(vec![context(
            "root",
            vec![
                context(
                    "a",
                    vec![context("a1", vec![context("a1x", vec![], &["Deep"])], &["A1"])],
                    &["A"],
                ),
                context("b", vec![], &["B1", "B2"]),
            ],
            &["RootOwn"],
        )])
        .unwrap();

        let entities = LibraryResolver::new(&library).collect_entities();
        assert_eq!(names(&entities), vec!["Deep", "A1", "A", "B1", "B2"]);
    }

    #[test]
    fn test_only_first_root_is_walked() {
        let library = ObjectLibrary::from_roots(vec![
            context("first", vec![context("x", vec![], &["X"])], &[]),
            context("second", vec![context("y", vec![], &["Y"])], &[]),
        ])
        .unwrap();

        let entities = LibraryResolver::new(&library).collect_entities();
        assert_eq!(names(&entities), vec!["X"]);
        assert!(LibraryResolver::new(&ObjectLibrary::new()).collect_entities().is_empty());
    }

    #[test]
    fn test_elements_split_into_properties_and_navigations() {
        let order = LibraryEntity::new("Order", "shop.Order")
            .with_annotation("entityType", "shop.OrderType")
            .with_element(LibraryElement::simple("id", "Integer").key())
            .with_element(LibraryElement::association("customer", Some(1), Some("shop.Customer")))
            .with_element(LibraryElement::simple("total", "Decimal"))
            .with_element(LibraryElement::association("lines", None, Some("shop.Missing")));
        let customer = LibraryEntity::new("Customer", "shop.Customer");

        let library = ObjectLibrary::from_roots(vec![ContextJson {
            name: "root".to_string(),
            contexts: vec![ContextJson {
                name: "shop".to_string(),
                contexts: vec![],
                entities: vec![order, customer],
            }],
            entities: vec![],
        }])
        .unwrap();

        let entities = LibraryResolver::new(&library).resolve();
        let order = &entities[0];

        assert_eq!(order.entity_type.as_deref(), Some("shop.OrderType"));
        assert_eq!(order.elements.len(), 2);
        assert_eq!(order.elements[0].name, "id");
        assert!(order.elements[0].is_key);
        assert_eq!(order.elements[1].remote_type, "Decimal");
        assert!(order.elements[1].source_type.is_none());

        assert_eq!(order.navigations.len(), 2);
        assert_eq!(order.navigations[0].multiplicity, "1");
        assert_eq!(order.navigations[0].target_index(), Some(1));
        assert_eq!(order.navigations[1].multiplicity, "*");
        assert!(order.navigations[1].elements.is_none());
        assert!(order.navigations[1].navigations.is_none());
    }
}
