//! Running an external C++ formatter over the written artifacts.

use crate::codegen::{EmitCategory, OutputPaths};
use crate::error::{CodegenError, Result};
use std::io;
use std::path::Path;
use tokio::process::Command;

pub const DEFAULT_FORMATTER: &str = "clang-format";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    program: String,
    /// Configured explicitly, so failing to start it is an error
    required: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            program: DEFAULT_FORMATTER.to_string(),
            required: false,
        }
    }
}

impl Formatter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            required: true,
        }
    }

    /// The configured formatter, or the default one if none is configured
    pub fn from_config(program: Option<String>) -> Self {
        program.map(Self::new).unwrap_or_default()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Format one file in place.
    ///
    /// Returns `false` if the default formatter is not installed.
    pub async fn format_file(&self, path: &Path) -> Result<bool> {
        let output = match Command::new(&self.program)
            .arg("-i")
            .arg(path)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !self.required => {
                tracing::warn!("{} not found, leaving artifacts unformatted", self.program);
                return Ok(false);
            }
            Err(e) => {
                return Err(CodegenError::FormatError {
                    path: path.to_path_buf(),
                    message: format!("failed to run {}: {e}", self.program),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CodegenError::FormatError {
                path: path.to_path_buf(),
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        tracing::debug!(program = %self.program, "formatted {}", path.display());
        Ok(true)
    }

    /// Format every artifact, declarations first
    pub async fn format_all(&self, paths: &OutputPaths) -> Result<()> {
        let artifacts = [None]
            .into_iter()
            .chain(EmitCategory::ALL.into_iter().map(Some));
        for artifact in artifacts {
            if !self.format_file(paths.get(artifact)).await? {
                return Ok(());
            }
        }
        tracing::info!("formatted artifacts with {}", self.program);
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn scratch_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("protocol.h");
        std::fs::write(&path, "struct A {};\n").expect("write");
        (dir, path)
    }

    #[test]
    fn test_from_config() {
        assert_eq!(Formatter::from_config(None).program(), DEFAULT_FORMATTER);
        assert_eq!(
            Formatter::from_config(Some("clang-format-18".into())),
            Formatter::new("clang-format-18")
        );
    }

    #[tokio::test]
    async fn test_successful_formatter() {
        let (_dir, path) = scratch_file();
        let formatted = Formatter::new("true").format_file(&path).await;
        assert!(formatted.expect("format"));
    }

    #[tokio::test]
    async fn test_failing_formatter() {
        let (_dir, path) = scratch_file();
        let err = Formatter::new("false")
            .format_file(&path)
            .await
            .expect_err("non-zero exit");
        assert!(matches!(err, CodegenError::FormatError { .. }));
    }

    #[tokio::test]
    async fn test_missing_default_formatter_is_skipped() {
        let (_dir, path) = scratch_file();
        let formatter = Formatter {
            program: "dap-protocol-gen-no-such-formatter".to_string(),
            required: false,
        };
        assert!(!formatter.format_file(&path).await.expect("skipped"));
    }

    #[tokio::test]
    async fn test_missing_configured_formatter_fails() {
        let (_dir, path) = scratch_file();
        let err = Formatter::new("dap-protocol-gen-no-such-formatter")
            .format_file(&path)
            .await
            .expect_err("configured formatter must run");
        assert!(matches!(err, CodegenError::FormatError { .. }));
    }
}
