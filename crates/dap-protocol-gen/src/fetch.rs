//! Loading the protocol schema document and the generator configuration.

pub mod config;
pub mod sources;

pub use config::{Config, OutputConfig};
pub use sources::{
    DEFAULT_SCHEMA_URL, HttpSource, LocalSource, SchemaSource, Source, SourceType,
};
