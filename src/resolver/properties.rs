//! Property flattening
//!
//! Turns a declared type into its ordered leaf properties: own properties
//! first (complex-typed ones expanded in place under a `/` path), then the
//! base chain's.

use crate::annotations::{from_extensions, property_attributes};
use crate::error::{ModelError, Result};
use crate::metadata::RawProperty;
use crate::model::Property;
use crate::normalize::{is_complex_type_reference, normalize_type};
use crate::resolver::inheritance::base_chain;
use crate::resolver::lookup::{QualifiedType, SchemaIndex, TypeKind};

pub const PATH_SEPARATOR: &str = "/";

pub struct PropertyResolver<'a> {
    index: SchemaIndex<'a>,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(index: SchemaIndex<'a>) -> Self {
        Self { index }
    }

    /// Flattened properties of an entity type, inherited ones last.
    pub fn entity_properties(&self, entity_type: QualifiedType<'a>) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        let mut expanding = Vec::new();
        self.collect(entity_type, TypeKind::Entity, "", &mut expanding, &mut properties)?;
        Ok(properties)
    }

    /// Leaf properties of the complex type `reference`, each named
    /// `path_prefix/leaf` (or just `leaf` with an empty prefix).
    pub fn expand(&self, reference: &str, path_prefix: &str) -> Result<Vec<Property>> {
        let mut properties = Vec::new();
        let mut expanding = Vec::new();
        self.expand_into(reference, path_prefix, path_prefix, &mut expanding, &mut properties)?;
        Ok(properties)
    }

    fn collect(
        &self,
        ty: QualifiedType<'a>,
        kind: TypeKind,
        path_prefix: &str,
        expanding: &mut Vec<String>,
        out: &mut Vec<Property>,
    ) -> Result<()> {
        for link in base_chain(&self.index, ty, kind)? {
            for raw in &link.ty.property {
                let name = qualify(path_prefix, &raw.name);
                match self.leaf(link, raw, name) {
                    Leaf::Scalar(property) => out.push(property),
                    Leaf::Complex(path) => {
                        self.expand_into(&raw.type_name, &raw.name, &path, expanding, out)?
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf(&self, owner: QualifiedType<'a>, raw: &RawProperty, name: String) -> Leaf {
        let annotations = from_extensions(&raw.extensions);
        let attributes = property_attributes(raw);
        let remote_type = normalize_type(&raw.type_name, &annotations, &attributes);
        if is_complex_type_reference(&remote_type) {
            return Leaf::Complex(name);
        }
        Leaf::Scalar(Property {
            name,
            is_key: owner.ty.is_key(&raw.name),
            source_type: Some(raw.type_name.clone()),
            remote_type,
            annotations,
            attributes,
        })
    }

    fn expand_into(
        &self,
        reference: &str,
        property_name: &str,
        path_prefix: &str,
        expanding: &mut Vec<String>,
        out: &mut Vec<Property>,
    ) -> Result<()> {
        let complex = self
            .index
            .complex_type(reference)
            .ok_or_else(|| ModelError::UnresolvableComplexType {
                type_name: reference.to_string(),
                property: property_name.to_string(),
            })?;

        let qualified_name = complex.qualified_name();
        if expanding.contains(&qualified_name) {
            return Err(ModelError::CyclicComplexType {
                type_name: qualified_name,
            });
        }

        expanding.push(qualified_name);
        self.collect(complex, TypeKind::Complex, path_prefix, expanding, out)?;
        expanding.pop();
        Ok(())
    }
}

enum Leaf {
    Scalar(Property),
    Complex(String),
}

fn qualify(path_prefix: &str, name: &str) -> String {
    if path_prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", path_prefix, PATH_SEPARATOR, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{Key, PropertyRef, Schema, StructuredType};

    fn structured(name: &str, properties: Vec<RawProperty>) -> StructuredType {
        StructuredType {
            name: name.to_string(),
            property: properties,
            ..Default::default()
        }
    }

    fn names(properties: &[Property]) -> Vec<&str> {
        properties.iter().map(|p| p.name.as_str()).collect()
    }

    fn nested_schema() -> Vec<Schema> {
        let mut customer = structured(
            "Customer",
            vec![
                RawProperty::new("ID", "Edm.Int32"),
                RawProperty::new("Address", "NS.Address"),
                RawProperty::new("Name", "Edm.String"),
            ],
        );
        customer.key = Some(Key {
            property_ref: vec![PropertyRef { name: "ID".to_string() }],
        });

        vec![Schema {
            namespace: "NS".to_string(),
            entity_type: vec![customer],
            complex_type: vec![
                structured(
                    "Address",
                    vec![
                        RawProperty::new("Street", "Edm.String"),
                        RawProperty::new("Geo", "NS.Geo"),
                        RawProperty::new("City", "Edm.String"),
                    ],
                ),
                structured(
                    "Geo",
                    vec![
                        RawProperty::new("Lat", "Edm.Double"),
                        RawProperty::new("Lon", "Edm.Double"),
                    ],
                ),
            ],
            ..Default::default()
        }]
    }

    #[test]
    fn test_nested_complex_types_flatten_in_place() {
        let schemas = nested_schema();
        let index = SchemaIndex::new(&schemas);
        let resolver = PropertyResolver::new(index);

        let properties = resolver
            .entity_properties(index.entity_type("NS.Customer").unwrap())
            .unwrap();

        assert_eq!(
            names(&properties),
            vec!["ID", "Address/Street", "Address/Geo/Lat", "Address/Geo/Lon", "Address/City", "Name"]
        );
        assert!(properties[0].is_key);
        assert!(properties[1..].iter().all(|p| !p.is_key));
        assert_eq!(properties[2].remote_type, "BinaryFloat");
        assert_eq!(properties[2].source_type.as_deref(), Some("Edm.Double"));
    }

    #[test]
    fn test_expand_with_and_without_prefix() {
        let schemas = nested_schema();
        let resolver = PropertyResolver::new(SchemaIndex::new(&schemas));

        let bare = resolver.expand("NS.Geo", "").unwrap();
        assert_eq!(names(&bare), vec!["Lat", "Lon"]);

        let prefixed = resolver.expand("Address", "Home").unwrap();
        assert_eq!(names(&prefixed), vec!["Home/Street", "Home/Geo/Lat", "Home/Geo/Lon", "Home/City"]);
    }

    #[test]
    fn test_unresolvable_complex_type() {
        let schemas = vec![Schema {
            namespace: "NS".to_string(),
            entity_type: vec![structured("Order", vec![RawProperty::new("Ship", "NS.Missing")])],
            ..Default::default()
        }];
        let index = SchemaIndex::new(&schemas);

        let err = PropertyResolver::new(index)
            .entity_properties(index.entity_type("NS.Order").unwrap())
            .unwrap_err();
        match err {
            ModelError::UnresolvableComplexType { type_name, property } => {
                assert_eq!(type_name, "NS.Missing");
                assert_eq!(property, "Ship");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_self_containing_complex_type() {
        let schemas = vec![Schema {
            namespace: "NS".to_string(),
            complex_type: vec![structured("Node", vec![RawProperty::new("Next", "NS.Node")])],
            ..Default::default()
        }];

        let err = PropertyResolver::new(SchemaIndex::new(&schemas))
            .expand("NS.Node", "Head")
            .unwrap_err();
        assert!(matches!(err, ModelError::CyclicComplexType { ref type_name } if type_name == "NS.Node"));
    }

    #[test]
    fn test_same_complex_type_twice_is_not_a_cycle() {
        let schemas = vec![Schema {
            namespace: "NS".to_string(),
            entity_type: vec![structured(
                "Order",
                vec![RawProperty::new("Billing", "NS.Geo"), RawProperty::new("Shipping", "NS.Geo")],
            )],
            complex_type: vec![structured("Geo", vec![RawProperty::new("Lat", "Edm.Double")])],
            ..Default::default()
        }];
        let index = SchemaIndex::new(&schemas);

        let properties = PropertyResolver::new(index)
            .entity_properties(index.entity_type("NS.Order").unwrap())
            .unwrap();
        assert_eq!(names(&properties), vec!["Billing/Lat", "Shipping/Lat"]);
    }

    #[test]
    fn test_complex_base_type_members_keep_path() {
        let schemas = vec![Schema {
            namespace: "NS".to_string(),
            entity_type: vec![structured(
                "Customer",
                vec![RawProperty::new("ID", "Edm.Int32"), RawProperty::new("Addr", "NS.PostalAddress")],
            )],
            complex_type: vec![
                StructuredType {
                    base_type: Some("NS.BaseAddress".to_string()),
                    ..structured("PostalAddress", vec![RawProperty::new("Zip", "Edm.String")])
                },
                StructuredType {
                    base_type: Some("Place".to_string()),
                    ..structured("BaseAddress", vec![RawProperty::new("Street", "Edm.String")])
                },
                structured("Place", vec![RawProperty::new("Country", "Edm.String")]),
            ],
            ..Default::default()
        }];
        let index = SchemaIndex::new(&schemas);
        let resolver = PropertyResolver::new(index);

        let properties = resolver
            .entity_properties(index.entity_type("NS.Customer").unwrap())
            .unwrap();
        assert_eq!(names(&properties), vec!["ID", "Addr/Zip", "Addr/Street", "Addr/Country"]);

        let expanded = resolver.expand("PostalAddress", "Ship").unwrap();
        assert_eq!(names(&expanded), vec!["Ship/Zip", "Ship/Street", "Ship/Country"]);
    }

    #[test]
    fn test_inherited_properties_follow_own() {
        let schemas = vec![Schema {
            namespace: "NS".to_string(),
            entity_type: vec![
                StructuredType {
                    base_type: Some("NS.B".to_string()),
                    ..structured("A", vec![RawProperty::new("a1", "Edm.String"), RawProperty::new("a2", "Edm.String")])
                },
                StructuredType {
                    base_type: Some("NS.C".to_string()),
                    ..structured("B", vec![RawProperty::new("b1", "Edm.String")])
                },
                StructuredType {
                    key: Some(Key {
                        property_ref: vec![PropertyRef { name: "c1".to_string() }],
                    }),
                    ..structured("C", vec![RawProperty::new("c1", "Edm.Int64")])
                },
            ],
            ..Default::default()
        }];
        let index = SchemaIndex::new(&schemas);

        let properties = PropertyResolver::new(index)
            .entity_properties(index.entity_type("NS.A").unwrap())
            .unwrap();
        assert_eq!(names(&properties), vec!["a1", "a2", "b1", "c1"]);
        assert!(properties[3].is_key);
    }
}
