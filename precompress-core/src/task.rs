//! Per-file compression task

use crate::error::{Result, TaskError};
use crate::outcome::{Outcome, TaskReport};
use precompress_codec::{Codec, CompressionError};
use precompress_config::Settings;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Path of the artifact `codec` writes for `source`: `<source><suffix>`.
pub fn artifact_path(source: &Path, codec: Codec) -> PathBuf {
    let mut path = source.as_os_str().to_owned();
    path.push(codec.suffix());
    PathBuf::from(path)
}

/// Write an artifact so that it either appears with its final bytes or not at all.
///
/// `fill` writes into a temporary file next to `artifact`, which is then
/// renamed into place. On any error the temporary file is removed and
/// `artifact` is left untouched.
pub fn write_atomically<F>(artifact: &Path, permissions: fs::Permissions, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = artifact
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    // A leading dot keeps the partial file out of the extension allow-list
    let mut file = tempfile::Builder::new()
        .prefix(".precompress-")
        .suffix(".part")
        .tempfile_in(dir)?;

    let out: &mut dyn Write = &mut file;
    fill(out)?;
    file.flush()?;
    file.as_file().set_permissions(permissions)?;
    file.persist(artifact).map_err(|e| e.error)?;
    Ok(())
}

/// Compress one source file with one codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionTask {
    pub source: PathBuf,
    pub codec: Codec,
}

impl CompressionTask {
    pub fn new(source: impl Into<PathBuf>, codec: Codec) -> Self {
        Self {
            source: source.into(),
            codec,
        }
    }

    /// Path of the artifact this task produces
    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(&self.source, self.codec)
    }

    /// Run the task. Errors are logged and reported as [`Outcome::Failed`].
    pub fn run(&self, settings: &Settings) -> TaskReport {
        let outcome = match self.try_run(settings) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(codec = %self.codec, "{}", e);
                Outcome::Failed(e.to_string())
            }
        };

        tracing::debug!(
            path = %self.source.display(),
            codec = %self.codec,
            outcome = outcome.label(),
            "Task finished"
        );

        TaskReport {
            source: self.source.clone(),
            codec: self.codec,
            outcome,
        }
    }

    fn try_run(&self, settings: &Settings) -> Result<Outcome> {
        let artifact = self.artifact_path();
        let exists = artifact.try_exists().map_err(|source| TaskError::Inspect {
            path: artifact.clone(),
            source,
        })?;

        if exists && !settings.overwrite() {
            tracing::debug!(path = %artifact.display(), "Artifact already exists; skipping");
            return Ok(Outcome::SkippedExists);
        }

        let data = fs::read(&self.source).map_err(|source| TaskError::Read {
            path: self.source.clone(),
            source,
        })?;
        let permissions = fs::metadata(&self.source)
            .map_err(|source| TaskError::Inspect {
                path: self.source.clone(),
                source,
            })?
            .permissions();

        let compressed = match self.codec.compress(&data) {
            Ok(compressed) => compressed,
            Err(CompressionError::SizeIncrease { original, compressed }) => {
                return self.discard(&artifact, exists, original, compressed);
            }
            Err(e) => return Err(e.into()),
        };

        if exists {
            tracing::warn!("Overwriting existing file {}", artifact.display());
        }

        write_atomically(&artifact, permissions, |out| out.write_all(&compressed)).map_err(
            |source| TaskError::Write {
                path: artifact.clone(),
                source,
            },
        )?;

        tracing::debug!(
            path = %artifact.display(),
            original = data.len(),
            compressed = compressed.len(),
            "Wrote artifact"
        );

        Ok(Outcome::Written { replaced: exists })
    }

    /// Handle output that would not be smaller than the source.
    ///
    /// A pre-existing artifact is stale at this point (it is only reachable
    /// with overwriting enabled) and is removed.
    fn discard(
        &self,
        artifact: &Path,
        exists: bool,
        original: usize,
        compressed: usize,
    ) -> Result<Outcome> {
        if !exists {
            tracing::debug!(
                path = %self.source.display(),
                codec = %self.codec,
                original,
                compressed,
                "Compression would increase the file size; skipping"
            );
            return Ok(Outcome::SkippedSizeIncrease { erased: false });
        }

        fs::remove_file(artifact).map_err(|source| TaskError::Remove {
            path: artifact.to_path_buf(),
            source,
        })?;

        tracing::warn!(
            "Removed {} because {} compression no longer reduces the size of {}",
            artifact.display(),
            self.codec,
            self.source.display()
        );

        Ok(Outcome::SkippedSizeIncrease { erased: true })
    }
}
