use crate::error::{CodegenError, Result};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::emit::OutputSinks;
use super::{CodeGenerator, EmitCategory};

/// Destination of every artifact
pub type OutputPaths = OutputSinks<PathBuf>;

/// Every artifact rendered into memory
pub type GeneratedArtifacts = OutputSinks<String>;

impl OutputPaths {
    /// Resolve every relative path against `base`
    pub fn relative_to(self, base: &Path) -> Self {
        self.map(|_, path| {
            if path.is_relative() {
                base.join(path)
            } else {
                path
            }
        })
    }
}

fn artifact_name(artifact: Option<EmitCategory>) -> &'static str {
    artifact.map_or("declarations", |c| c.as_str())
}

impl<'c> CodeGenerator<'c> {
    /// Build every record and render all artifacts into memory
    pub fn generate_all(&self) -> Result<GeneratedArtifacts> {
        let records = self.build_records()?;
        let mut sinks = OutputSinks::<Vec<u8>>::default();
        self.emit(&records, &mut sinks)?;
        Ok(sinks.map(|_, bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Build every record and write all artifacts to `paths`.
    ///
    /// Artifacts are written to temporary files beside their destinations and
    /// only moved into place once every one of them is complete, so a build or
    /// emission failure leaves existing artifacts as they were. Each rename is
    /// atomic on its own but the set is not: if persisting one artifact fails,
    /// the ones renamed before it stay replaced.
    pub fn write_to_disk(&self, paths: &OutputPaths) -> Result<()> {
        let records = self.build_records()?;

        let mut sinks = OutputSinks::try_new(|artifact| {
            let path = paths.get(artifact);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            fs::create_dir_all(dir).map_err(|e| CodegenError::output(dir, e))?;
            let file = NamedTempFile::new_in(dir).map_err(|e| CodegenError::output(path, e))?;
            Ok::<_, CodegenError>(BufWriter::new(file))
        })?;

        self.emit(&records, &mut sinks)?;

        let files = sinks.try_map(|artifact, writer| {
            let path = paths.get(artifact);
            let mut file = writer
                .into_inner()
                .map_err(|e| CodegenError::output(path, e.into_error()))?;
            file.flush().map_err(|e| CodegenError::output(path, e))?;
            Ok::<_, CodegenError>(file)
        })?;

        files.try_map(|artifact, file| {
            let path = paths.get(artifact);
            file.persist(path)
                .map_err(|e| CodegenError::output(path, e.error))?;
            tracing::info!(
                artifact = artifact_name(artifact),
                "wrote {}",
                path.display()
            );
            Ok::<_, CodegenError>(())
        })?;

        Ok(())
    }
}
