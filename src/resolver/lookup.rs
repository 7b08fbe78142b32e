use crate::metadata::{AssociationEnd, Schema, StructuredType};

/// A declared type together with the namespace of the schema declaring it.
#[derive(Debug, Clone, Copy)]
pub struct QualifiedType<'a> {
    pub namespace: &'a str,
    pub ty: &'a StructuredType,
}

impl<'a> QualifiedType<'a> {
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.ty.name)
    }
}

/// Which declaration list a type name is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Entity,
    Complex,
}

/// Read-only lookups across every schema of a metadata document. All
/// lookups return the first match in schema declaration order.
#[derive(Debug, Clone, Copy)]
pub struct SchemaIndex<'a> {
    schemas: &'a [Schema],
}

impl<'a> SchemaIndex<'a> {
    pub fn new(schemas: &'a [Schema]) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &'a [Schema] {
        self.schemas
    }

    /// Entity types are addressed by `namespace.name` only.
    pub fn entity_type(&self, qualified_name: &str) -> Option<QualifiedType<'a>> {
        self.schemas.iter().find_map(|schema| {
            schema
                .entity_type
                .iter()
                .find(|ty| is_qualified(&schema.namespace, &ty.name, qualified_name))
                .map(|ty| QualifiedType {
                    namespace: schema.namespace.as_str(),
                    ty,
                })
        })
    }

    /// Complex types match on either the simple or the qualified name.
    pub fn complex_type(&self, reference: &str) -> Option<QualifiedType<'a>> {
        self.schemas.iter().find_map(|schema| {
            schema
                .complex_type
                .iter()
                .find(|ty| ty.name == reference || is_qualified(&schema.namespace, &ty.name, reference))
                .map(|ty| QualifiedType {
                    namespace: schema.namespace.as_str(),
                    ty,
                })
        })
    }

    pub fn find(&self, kind: TypeKind, name: &str) -> Option<QualifiedType<'a>> {
        match kind {
            TypeKind::Entity => self.entity_type(name),
            TypeKind::Complex => self.complex_type(name),
        }
    }

    /// End with role `role` of the association named `association`. An
    /// association without that role does not stop the search.
    pub fn association_end(&self, association: &str, role: &str) -> Option<&'a AssociationEnd> {
        self.schemas
            .iter()
            .flat_map(|schema| schema.association.iter())
            .filter(|a| a.name == association)
            .find_map(|a| a.end.iter().find(|end| end.role == role))
    }
}

fn is_qualified(namespace: &str, name: &str, qualified_name: &str) -> bool {
    qualified_name
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix('.'))
        == Some(name)
}
