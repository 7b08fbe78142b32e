//! Model assembly
//!
//! Picks the resolver for the supplied source, runs entity resolution and
//! then navigation resolution, and returns the canonical document.

use crate::error::{ModelError, Result};
use crate::library::{ObjectLibrary, ObjectLibraryJson};
use crate::metadata::ServiceMetadata;
use crate::model::DataSourceModel;
use crate::resolver::{LibraryResolver, RelationalResolver};
use serde_json::Value;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub enum MetadataSource {
    Relational(ServiceMetadata),
    Library(ObjectLibrary),
}

impl MetadataSource {
    /// Chooses the source kind by document shape: `dataServices` or `schema`
    /// means service metadata, `roots` means an object library.
    pub fn from_value(value: Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(ModelError::UnrecognizedSource);
        };

        if object.contains_key("dataServices") || object.contains_key("schema") {
            let metadata: ServiceMetadata = serde_json::from_value(value)?;
            Ok(MetadataSource::Relational(metadata))
        } else if object.contains_key("roots") {
            let library_json: ObjectLibraryJson = serde_json::from_value(value)?;
            Ok(MetadataSource::Library(ObjectLibrary::from_roots(library_json.roots)?))
        } else {
            Err(ModelError::UnrecognizedSource)
        }
    }

    pub fn from_json(json_str: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json_str)
            .map_err(|e| ModelError::Metadata(format!("Failed to parse metadata document: {}", e)))?;
        Self::from_value(value)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Metadata(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MetadataSource::Relational(_) => "service metadata",
            MetadataSource::Library(_) => "object library",
        }
    }
}

pub fn assemble(source: &MetadataSource) -> Result<DataSourceModel> {
    info!("Assembling model from {}", source.kind());
    let model = match source {
        MetadataSource::Relational(metadata) => assemble_relational(metadata)?,
        MetadataSource::Library(library) => assemble_library(library),
    };
    info!("Assembled {} entities", model.entities.len());
    Ok(model)
}

pub fn assemble_relational(metadata: &ServiceMetadata) -> Result<DataSourceModel> {
    let entities = RelationalResolver::new(metadata).resolve()?;
    Ok(DataSourceModel::new(entities))
}

pub fn assemble_library(library: &ObjectLibrary) -> DataSourceModel {
    DataSourceModel::new(LibraryResolver::new(library).resolve())
}

/// Holds the metadata source for one generation request.
#[derive(Debug, Clone, Default)]
pub struct DataProvider {
    source: Option<MetadataSource>,
    url: Option<String>,
}

impl DataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// `url` is where the metadata was fetched from, if anywhere.
    pub fn init(&mut self, source: MetadataSource, url: Option<String>) {
        self.source = Some(source);
        self.url = url;
    }

    pub fn is_initialized(&self) -> bool {
        self.source.is_some()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn source(&self) -> Option<&MetadataSource> {
        self.source.as_ref()
    }

    /// The assembled model, or `None` before `init`.
    pub fn model_representation(&self) -> Result<Option<DataSourceModel>> {
        self.source.as_ref().map(assemble).transpose()
    }
}
