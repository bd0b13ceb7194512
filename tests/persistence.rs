//! Cart persistence across engine instances, on disk and with a failing store.

use std::{
    fs, io,
    sync::atomic::{AtomicUsize, Ordering},
};

use rust_decimal_macros::dec;
use serde_json::json;
use testresult::TestResult;

use storefront_cart::prelude::*;

/// A store whose writes always fail.
#[derive(Debug, Default)]
struct ReadOnlyStore {
    attempts: AtomicUsize,
}

impl BlobStore for ReadOnlyStore {
    fn load_blob(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(None)
    }

    fn save_blob(&self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
    }

    fn delete_blob(&self, _key: &str) -> Result<(), StorageError> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only").into())
    }
}

#[test]
fn cart_survives_a_restart() -> TestResult {
    let dir = tempfile::tempdir()?;

    {
        let engine = CartEngine::open(FileBlobStore::new(dir.path()));

        engine.add(NewCartLine::new("s1", "A", 2, dec!(4.20)))?;
        engine.add(NewCartLine::new("s2", "B", 1, dec!(0.99)))?;
        engine.update_quantity(&StockId::from("s1"), &StoreId::from("A"), 3, dec!(6.30))?;
        engine.assign_address(&StoreId::from("A"), &ShippingAddress::labelled("a1", "Home"));
    }

    let engine = CartEngine::open(FileBlobStore::new(dir.path()));

    assert_eq!(engine.len(), 2);
    assert_eq!(engine.subtotal_for_store(&StoreId::from("A")), dec!(6.30));

    let line = engine
        .lines_for_store(&StoreId::from("A"))
        .into_iter()
        .next()
        .ok_or("line missing")?;

    assert_eq!(line.quantity, 3);
    assert_eq!(
        line.shipping_address,
        Some(ShippingAddress::labelled("a1", "Home"))
    );

    Ok(())
}

#[test]
fn clear_removes_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let engine = CartEngine::open(FileBlobStore::new(dir.path()));

    engine.add(NewCartLine::new("s1", "A", 1, dec!(1)))?;
    assert!(dir.path().join("cart.blob").exists());

    engine.clear();

    assert!(!dir.path().join("cart.blob").exists());
    assert!(CartEngine::open(FileBlobStore::new(dir.path())).is_empty());

    Ok(())
}

#[test]
fn corrupt_file_starts_an_empty_cart() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("cart.blob"), b"\x00\x01 definitely not a cart")?;

    let engine = CartEngine::open(FileBlobStore::new(dir.path()));

    assert!(engine.is_empty());

    engine.add(NewCartLine::new("s1", "A", 1, dec!(1)))?;

    assert_eq!(CartEngine::open(FileBlobStore::new(dir.path())).len(), 1);

    Ok(())
}

#[test]
fn write_failures_never_reach_the_caller() -> TestResult {
    let engine = CartEngine::new(ReadOnlyStore::default());

    engine.add(NewCartLine::new("s1", "A", 1, dec!(1)))?;
    engine.add(NewCartLine::new("s2", "A", 1, dec!(1)))?;
    engine.remove_all_for_store(&StoreId::from("A"));
    engine.clear();

    assert!(engine.is_empty());
    assert_eq!(engine.store().attempts.load(Ordering::SeqCst), 3);

    Ok(())
}

#[test]
fn blob_is_versioned_json() -> TestResult {
    let dir = tempfile::tempdir()?;
    let engine = CartEngine::new(FileBlobStore::new(dir.path()));

    engine.add(NewCartLine::new("s1", "A", 1, dec!(2.50)))?;

    let raw = fs::read_to_string(dir.path().join("cart.blob"))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    assert_eq!(value.pointer("/version"), Some(&json!(1)));
    assert_eq!(value.pointer("/lines/0/stock_id"), Some(&json!("s1")));
    assert_eq!(value.pointer("/lines/0/price"), Some(&json!("2.50")));

    Ok(())
}
