//! File-backed blob store

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{BlobStore, StorageError, validate_key};

const BLOB_EXTENSION: &str = "blob";

/// A blob store that keeps one file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written blob.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the blobs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;

        Ok(self.dir.join(format!("{key}.{BLOB_EXTENSION}")))
    }
}

impl BlobStore for FileBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.blob_path(key)?;

        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.blob_path(key)?;
        let staging = path.with_extension(format!("{BLOB_EXTENSION}.tmp"));

        fs::create_dir_all(&self.dir)?;
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &path)?;

        debug!(path = %path.display(), bytes = bytes.len(), "blob written");

        Ok(())
    }

    fn delete_blob(&self, key: &str) -> Result<(), StorageError> {
        let path = self.blob_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
