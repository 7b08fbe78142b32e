//! Relational source resolution
//!
//! Entities come from entity sets, in schema → container → set order.
//! Navigations are resolved in a second pass against the finished list.

use crate::annotations::entity_annotations;
use crate::error::{ModelError, Result};
use crate::metadata::{EntityContainer, EntitySet, NavigationProperty, Schema, ServiceMetadata};
use crate::model::{Entity, Navigation};
use crate::normalize::normalize_multiplicity;
use crate::resolver::inheritance::base_chain;
use crate::resolver::lookup::{QualifiedType, SchemaIndex, TypeKind};
use crate::resolver::properties::PropertyResolver;
use tracing::debug;

pub struct RelationalResolver<'a> {
    index: SchemaIndex<'a>,
    properties: PropertyResolver<'a>,
}

impl<'a> RelationalResolver<'a> {
    pub fn new(metadata: &'a ServiceMetadata) -> Self {
        let index = SchemaIndex::new(&metadata.schemas);
        Self {
            index,
            properties: PropertyResolver::new(index),
        }
    }

    /// Both passes: entities with properties, then navigations.
    pub fn resolve(&self) -> Result<Vec<Entity>> {
        let (mut entities, entity_types) = self.resolve_entities()?;

        let navigations = entity_types
            .iter()
            .map(|ty| self.resolve_navigations(*ty, &entities))
            .collect::<Result<Vec<_>>>()?;

        for (entity, navigations) in entities.iter_mut().zip(navigations) {
            entity.navigations = navigations;
        }
        Ok(entities)
    }

    /// Entities without navigations, paired with the entity type each one
    /// was built from. Sets whose type is not declared are skipped.
    pub fn resolve_entities(&self) -> Result<(Vec<Entity>, Vec<QualifiedType<'a>>)> {
        let mut entities = Vec::new();
        let mut entity_types = Vec::new();

        for schema in self.index.schemas() {
            for container in &schema.entity_container {
                for entity_set in &container.entity_set {
                    let Some(entity_type) = self.index.entity_type(&entity_set.entity_type) else {
                        debug!(
                            "Skipping entity set {}: entity type {} not found",
                            entity_set.name, entity_set.entity_type
                        );
                        continue;
                    };

                    entities.push(self.resolve_entity(schema, container, entity_set, entity_type)?);
                    entity_types.push(entity_type);
                }
            }
        }

        Ok((entities, entity_types))
    }

    fn resolve_entity(
        &self,
        schema: &Schema,
        container: &EntityContainer,
        entity_set: &EntitySet,
        entity_type: QualifiedType<'a>,
    ) -> Result<Entity> {
        Ok(Entity {
            name: display_name(container, entity_set),
            entity_type: Some(entity_set.entity_type.clone()),
            fully_qualified_name: Some(format!(
                "{}.{}.{}",
                schema.namespace, container.name, entity_set.name
            )),
            elements: self.properties.entity_properties(entity_type)?,
            navigations: Vec::new(),
            annotations: Some(entity_annotations(entity_set, entity_type.ty)),
        })
    }

    /// Navigations of `entity_type` and its base types, addressed by the
    /// position of their target in `entities`.
    pub fn resolve_navigations(
        &self,
        entity_type: QualifiedType<'a>,
        entities: &[Entity],
    ) -> Result<Vec<Navigation>> {
        let mut navigations = Vec::new();
        for link in base_chain(&self.index, entity_type, TypeKind::Entity)? {
            for navigation in &link.ty.navigation_property {
                navigations.push(self.resolve_navigation(navigation, entities)?);
            }
        }
        Ok(navigations)
    }

    fn resolve_navigation(
        &self,
        navigation: &NavigationProperty,
        entities: &[Entity],
    ) -> Result<Navigation> {
        let relationship = strip_namespace(&navigation.relationship);
        let end = self
            .index
            .association_end(relationship, &navigation.to_role)
            .ok_or_else(|| ModelError::UnresolvableAssociationEnd {
                relationship: navigation.relationship.clone(),
                role: navigation.to_role.clone(),
            })?;

        let index = entities
            .iter()
            .position(|e| e.entity_type.as_deref() == Some(end.type_name.as_str()))
            .ok_or_else(|| ModelError::UnresolvableNavigationTarget {
                navigation: navigation.name.clone(),
                entity_type: end.type_name.clone(),
            })?;

        Ok(Navigation::resolved(
            navigation.name.clone(),
            normalize_multiplicity(&end.multiplicity),
            index,
        ))
    }
}

/// Set name, qualified with its container unless the container is the
/// default one.
fn display_name(container: &EntityContainer, entity_set: &EntitySet) -> String {
    if container.is_default_entity_container.is_set() {
        entity_set.name.clone()
    } else {
        format!("{}.{}", container.name, entity_set.name)
    }
}

fn strip_namespace(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
