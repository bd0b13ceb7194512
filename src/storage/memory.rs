//! In-memory blob store

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashMap;

use super::{BlobStore, StorageError, validate_key};

/// A blob store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<FxHashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl BlobStore for MemoryBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;

        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(blobs.get(key).cloned())
    }

    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;

        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes.to_vec());

        Ok(())
    }

    fn delete_blob(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;

        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_blob_loads_as_none() -> TestResult {
        let store = MemoryBlobStore::new();

        assert_eq!(store.load_blob("cart")?, None);

        Ok(())
    }

    #[test]
    fn save_then_delete() -> TestResult {
        let store = MemoryBlobStore::new();

        store.save_blob("cart", b"one")?;
        store.save_blob("cart", b"two")?;

        assert_eq!(store.load_blob("cart")?, Some(b"two".to_vec()));

        store.delete_blob("cart")?;
        store.delete_blob("cart")?;

        assert!(!store.contains("cart"));

        Ok(())
    }
}
