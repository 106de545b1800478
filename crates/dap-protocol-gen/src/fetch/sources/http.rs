use super::SchemaSource;
use crate::error::{CodegenError, Result};
use std::io;
use std::path::{Path, PathBuf};

/// The published debug adapter protocol schema
pub const DEFAULT_SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/microsoft/vscode-debugadapter-node/master/debugProtocol.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSource {
    pub url: String,
    /// Local copy of the document; read instead of the network when present
    pub cache: Option<PathBuf>,
}

impl Default for HttpSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_SCHEMA_URL.to_string(),
            cache: None,
        }
    }
}

impl HttpSource {
    async fn read_cache(&self) -> Option<Vec<u8>> {
        let cache = self.cache.as_deref()?;
        match tokio::fs::read(cache).await {
            Ok(bytes) => {
                tracing::info!(cache = %cache.display(), "using cached schema");
                Some(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(cache = %cache.display(), "ignoring unreadable schema cache: {e}");
                None
            }
        }
    }

    async fn download(&self) -> Result<Vec<u8>> {
        tracing::info!(url = %self.url, "downloading schema");
        let response = reqwest::get(&self.url)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CodegenError::fetch(&self.url, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| CodegenError::fetch(&self.url, e))?;
        Ok(bytes.to_vec())
    }
}

async fn write_cache(cache: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = cache.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(cache, bytes).await
}

impl SchemaSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        if let Some(bytes) = self.read_cache().await {
            return Ok(bytes);
        }

        let bytes = self.download().await?;

        if let Some(cache) = &self.cache {
            match write_cache(cache, &bytes).await {
                Ok(()) => tracing::debug!(cache = %cache.display(), "cached schema"),
                Err(e) => {
                    tracing::warn!(cache = %cache.display(), "failed to write schema cache: {e}")
                }
            }
        }

        Ok(bytes)
    }
}
