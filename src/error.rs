use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Unresolvable complex type '{type_name}' on property '{property}'")]
    UnresolvableComplexType { type_name: String, property: String },

    #[error("No association end for relationship '{relationship}' with role '{role}'")]
    UnresolvableAssociationEnd { relationship: String, role: String },

    #[error("Navigation '{navigation}' targets entity type '{entity_type}' which has no entity set")]
    UnresolvableNavigationTarget { navigation: String, entity_type: String },

    #[error("Base type chain of '{type_name}' is cyclic")]
    CyclicBaseType { type_name: String },

    #[error("Complex type '{type_name}' contains itself")]
    CyclicComplexType { type_name: String },

    #[error("Metadata document is neither a service metadata document nor an object library")]
    UnrecognizedSource,

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
