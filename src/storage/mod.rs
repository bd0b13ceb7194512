//! Blob Storage
//!
//! Key-value persistence used by the cart engine. Values are opaque bytes; the
//! engine owns their encoding.

use std::{io, sync::Arc};

use thiserror::Error;

mod file;
mod memory;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;

/// Errors raised by a blob store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The key cannot be mapped onto the backing store.
    #[error("invalid blob key: {0:?}")]
    InvalidKey(String),

    /// Underlying I/O failure.
    #[error("blob store I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// A durable key-value blob store.
#[cfg_attr(test, mockall::automock)]
pub trait BlobStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the blob cannot be written.
    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Delete the blob stored under `key`. Deleting a missing blob succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the blob cannot be removed.
    fn delete_blob(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load_blob(key)
    }

    fn save_blob(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).save_blob(key, bytes)
    }

    fn delete_blob(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete_blob(key)
    }
}

/// Keys map onto file names, so they are restricted to a portable alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_keys_are_valid() {
        assert!(validate_key("cart").is_ok());
        assert!(validate_key("cart-v2.backup").is_ok());
    }

    #[test]
    fn path_like_keys_are_rejected() {
        for key in ["", "../cart", "a/b", ".hidden", "cart key"] {
            assert!(
                matches!(validate_key(key), Err(StorageError::InvalidKey(_))),
                "expected {key:?} to be rejected"
            );
        }
    }

    #[test]
    fn arc_store_delegates() -> testresult::TestResult {
        let store = Arc::new(MemoryBlobStore::new());

        store.save_blob("cart", b"[]")?;

        assert_eq!(store.load_blob("cart")?, Some(b"[]".to_vec()));

        Ok(())
    }
}
