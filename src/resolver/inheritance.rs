use crate::error::{ModelError, Result};
use crate::resolver::lookup::{QualifiedType, SchemaIndex, TypeKind};
use std::collections::HashSet;
use tracing::debug;

/// `ty` followed by its base types, nearest first. A base type that is not
/// declared ends the chain; a base type seen twice is an error.
pub fn base_chain<'a>(
    index: &SchemaIndex<'a>,
    ty: QualifiedType<'a>,
    kind: TypeKind,
) -> Result<Vec<QualifiedType<'a>>> {
    let mut chain = vec![ty];
    let mut seen = HashSet::new();
    seen.insert(ty.qualified_name());

    let mut current = ty;
    while let Some(base_name) = current.ty.base_type.as_deref() {
        let Some(base) = index.find(kind, base_name) else {
            debug!("Base type {} of {} not found, ending chain", base_name, current.qualified_name());
            break;
        };
        if !seen.insert(base.qualified_name()) {
            return Err(ModelError::CyclicBaseType {
                type_name: ty.qualified_name(),
            });
        }
        chain.push(base);
        current = base;
    }

    Ok(chain)
}
