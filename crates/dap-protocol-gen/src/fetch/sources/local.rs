use super::SchemaSource;
use crate::error::{CodegenError, Result};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSource {
    pub path: PathBuf,
}

impl SchemaSource for LocalSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CodegenError::fetch(self.path.display().to_string(), e))?;
        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "read schema");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("debugProtocol.json");
        std::fs::write(&path, br#"{ "definitions": {} }"#).expect("write schema");

        let bytes = LocalSource { path }.fetch().await.expect("fetch");
        assert_eq!(bytes, br#"{ "definitions": {} }"#);
    }

    #[tokio::test]
    async fn test_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = LocalSource {
            path: dir.path().join("absent.json"),
        };
        let err = source.fetch().await.expect_err("missing file");
        assert!(matches!(err, CodegenError::Fetch { .. }));
    }
}
