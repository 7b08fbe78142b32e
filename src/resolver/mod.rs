//! Entity and navigation resolution for both metadata sources.

pub mod inheritance;
pub mod library;
pub mod lookup;
pub mod properties;
pub mod relational;

pub use library::LibraryResolver;
pub use lookup::{QualifiedType, SchemaIndex, TypeKind};
pub use properties::PropertyResolver;
pub use relational::RelationalResolver;
