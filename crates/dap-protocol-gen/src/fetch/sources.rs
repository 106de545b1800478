mod http;
mod local;

pub use http::{DEFAULT_SCHEMA_URL, HttpSource};
pub use local::LocalSource;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub source_type: SourceType,
}

impl Source {
    pub async fn fetch(&self) -> Result<Vec<u8>> {
        self.source_type.fetch().await
    }

    /// Where the schema comes from, for messages and diagnostics
    pub fn origin(&self) -> String {
        self.source_type.origin()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    Http(HttpSource),
    Local(LocalSource),
}

impl SourceType {
    pub fn origin(&self) -> String {
        match self {
            SourceType::Http(s) => s.url.clone(),
            SourceType::Local(s) => s.path.display().to_string(),
        }
    }
}

/// Something that can produce the raw bytes of a protocol schema document
pub trait SchemaSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>>;
}

impl SchemaSource for SourceType {
    async fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            SourceType::Http(s) => s.fetch().await,
            SourceType::Local(s) => s.fetch().await,
        }
    }
}
