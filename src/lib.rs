pub mod annotations;
pub mod assembler;
pub mod classify;
pub mod config;
pub mod error;
pub mod library;
pub mod metadata;
pub mod model;
pub mod normalize;
pub mod resolver;

pub use assembler::{assemble, DataProvider, MetadataSource};
pub use error::{ModelError, Result};
pub use model::{DataSourceModel, Entity, Navigation, Property};
