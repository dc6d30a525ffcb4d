//! Run-scoped sidecar artifacts.
//!
//! Every stage writes its text to `<root>/<run_id>/<stage>.md`. The files are
//! a debug trail and the second tier of output extraction; nothing depends
//! on them being written.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ArtifactError;

/// Directory of sidecar files for one run.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store for `run_id` under `root`.
    pub fn for_run(root: impl AsRef<Path>, run_id: &str) -> Self {
        Self {
            dir: root.as_ref().join(run_id),
        }
    }

    /// Directory holding this run's artifacts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of an artifact.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write (or overwrite) an artifact.
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf, ArtifactError> {
        fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path(name);
        fs::write(&path, content).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Artifact written");
        Ok(path)
    }

    /// Read an artifact; `Ok(None)` when it does not exist.
    pub fn read(&self, name: &str) -> Result<Option<String>, ArtifactError> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArtifactError::Io { path, source }),
        }
    }
}
