use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{AppError, Result};
use crate::models::session::CredentialRecord;
use crate::store::CredentialStore;

/// A credential store backed by one JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so the file on disk is always a complete record.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store for the given file. Parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<CredentialRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No credential file at {}", self.path.display());
                return Ok(CredentialRecord::default());
            }
            Err(e) => return Err(e.into()),
        };

        let record: CredentialRecord = sonic_rs::from_slice(&bytes)?;
        Ok(record)
    }

    fn save(&self, record: &CredentialRecord) -> Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let bytes = sonic_rs::to_vec(record)?;

        // Blocking I/O; callers hold the session write lock until the rename lands.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| {
            tracing::error!("Failed to replace {}: {}", self.path.display(), e.error);
            AppError::Storage(e.error.to_string())
        })?;

        tracing::debug!("Credential record written to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
