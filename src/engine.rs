//! Cart Engine
//!
//! The authoritative cart for a session. Every mutation runs under a single
//! lock covering the read, the change and the blob write, so concurrent callers
//! cannot break pair merging and blob writes land in mutation order.
//!
//! Persistence is best effort: a failed write is logged and the in-memory cart
//! stays as it is. The next successful write supersedes it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cart::{Cart, CartError},
    ids::{StockId, StoreId},
    lines::{CartLine, NewCartLine, ShippingAddress},
    pricing::to_money,
    storage::{BlobStore, StorageError},
};

/// Blob key the cart is stored under unless configured otherwise.
pub const CART_BLOB_KEY: &str = "cart";

/// Version written into every cart blob.
pub const CART_BLOB_VERSION: u32 = 1;

/// Reasons a stored cart could not be used. Only ever logged.
#[derive(Debug, Error)]
enum PersistenceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("cart blob is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported cart blob version {0}")]
    Version(u32),
}

#[derive(Serialize)]
struct CartBlobRef<'a> {
    version: u32,
    lines: Vec<&'a CartLine>,
}

#[derive(Deserialize)]
struct CartBlob {
    version: u32,
    lines: Vec<CartLine>,
}

/// Per-store aggregate for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSummary {
    /// Store
    pub store_id: StoreId,

    /// Number of lines in the store
    pub line_count: usize,

    /// Rounded sum of the store's line prices
    pub subtotal: Decimal,
}

/// Cart engine backed by a [`BlobStore`].
#[derive(Debug)]
pub struct CartEngine<S> {
    store: S,
    key: String,
    cart: Mutex<Cart>,
}

impl<S: BlobStore> CartEngine<S> {
    /// Create an engine with an empty cart. Call [`CartEngine::load`] to
    /// restore the persisted cart.
    pub fn new(store: S) -> Self {
        Self::with_key(store, CART_BLOB_KEY)
    }

    /// Create an engine storing its cart under a custom blob key.
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cart: Mutex::new(Cart::new()),
        }
    }

    /// Create an engine and immediately load the persisted cart.
    pub fn open(store: S) -> Self {
        let engine = Self::new(store);
        engine.load();
        engine
    }

    /// The backing blob store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the in-memory cart with the persisted one.
    ///
    /// A missing blob yields an empty cart. An unreadable or malformed blob is
    /// logged and also yields an empty cart. Returns the number of lines loaded.
    #[tracing::instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> usize {
        let mut cart = self.lock();

        *cart = match self.read_blob() {
            Ok(Some(lines)) => Cart::from_lines(lines),
            Ok(None) => Cart::new(),
            Err(err) => {
                warn!(error = %err, "discarding unreadable cart blob");
                Cart::new()
            }
        };

        info!(lines = cart.len(), "cart loaded");

        cart.len()
    }

    /// Add a line, merging it with an existing line for the same pair.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is zero, if the line or the
    /// merged line is not a whole number of boxes, or if the merged line would
    /// overflow. The cart is left untouched in that case.
    pub fn add(&self, line: NewCartLine) -> Result<(), CartError> {
        let mut cart = self.lock();

        let key = cart.add(line)?;

        if let Some(stored) = cart.line(key) {
            debug!(
                stock = %stored.stock_id,
                store = %stored.store_id,
                quantity = stored.quantity,
                "line added"
            );
        }

        self.persist(&cart);

        Ok(())
    }

    /// Replace quantity and price of the line for a pair.
    ///
    /// Returns `Ok(false)` without touching storage when no line matches.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the quantity is zero or breaks the line's box
    /// size. Zero never removes the line; use [`CartEngine::remove`].
    pub fn update_quantity(
        &self,
        stock: &StockId,
        store: &StoreId,
        quantity: u32,
        price: Decimal,
    ) -> Result<bool, CartError> {
        let mut cart = self.lock();

        let updated = cart.update_quantity(stock, store, quantity, price)?;

        if updated {
            debug!(%stock, %store, quantity, "line updated");
            self.persist(&cart);
        } else {
            debug!(%stock, %store, "update ignored, no such line");
        }

        Ok(updated)
    }

    /// Remove the line for a pair. Missing lines are ignored.
    pub fn remove(&self, stock: &StockId, store: &StoreId) -> Option<CartLine> {
        let mut cart = self.lock();

        let removed = cart.remove(stock, store);

        if removed.is_some() {
            debug!(%stock, %store, "line removed");
            self.persist(&cart);
        }

        removed
    }

    /// Remove every line of a store, e.g. after its order was placed.
    ///
    /// The removal is a single in-memory step followed by a single blob write.
    pub fn remove_all_for_store(&self, store: &StoreId) -> Vec<CartLine> {
        let mut cart = self.lock();

        let removed = cart.remove_store(store);

        if !removed.is_empty() {
            debug!(%store, lines = removed.len(), "store lines removed");
            self.persist(&cart);
        }

        removed
    }

    /// Assign a shipping address to every line of a store.
    ///
    /// Returns the number of lines updated.
    pub fn assign_address(&self, store: &StoreId, address: &ShippingAddress) -> usize {
        let mut cart = self.lock();

        let updated = cart.assign_address(store, address);

        if updated > 0 {
            debug!(%store, address = %address.id, lines = updated, "address assigned");
            self.persist(&cart);
        }

        updated
    }

    /// Empty the cart and delete its blob.
    pub fn clear(&self) {
        let mut cart = self.lock();

        cart.clear();

        if let Err(err) = self.store.delete_blob(&self.key) {
            warn!(key = %self.key, error = %err, "failed to delete cart blob");
        }

        debug!("cart cleared");
    }

    /// A store's lines in cart order.
    pub fn lines_for_store(&self, store: &StoreId) -> Vec<CartLine> {
        self.lock().lines_for_store(store).cloned().collect()
    }

    /// Every line in cart order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().iter().cloned().collect()
    }

    /// Sum of a store's line prices, rounded once to two decimal places.
    pub fn subtotal_for_store(&self, store: &StoreId) -> Decimal {
        self.lock().subtotal_for_store(store)
    }

    /// [`CartEngine::subtotal_for_store`] as money in the given currency.
    pub fn subtotal_money(
        &self,
        store: &StoreId,
        currency: &'static Currency,
    ) -> Money<'static, Currency> {
        to_money(self.subtotal_for_store(store), currency)
    }

    /// Number of lines belonging to a store.
    pub fn line_count_for_store(&self, store: &StoreId) -> usize {
        self.lock().line_count_for_store(store)
    }

    /// Stores with lines, in order of first appearance.
    pub fn store_ids(&self) -> SmallVec<[StoreId; 4]> {
        self.lock().store_ids()
    }

    /// Line count and subtotal for every store in the cart.
    pub fn store_summaries(&self) -> Vec<StoreSummary> {
        let cart = self.lock();

        cart.store_ids()
            .into_iter()
            .map(|store_id| StoreSummary {
                line_count: cart.line_count_for_store(&store_id),
                subtotal: cart.subtotal_for_store(&store_id),
                store_id,
            })
            .collect()
    }

    /// Total unit count across the cart.
    pub fn total_quantity(&self) -> u64 {
        self.lock().total_quantity()
    }

    /// Number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_blob(&self) -> Result<Option<Vec<CartLine>>, PersistenceError> {
        let Some(bytes) = self.store.load_blob(&self.key)? else {
            return Ok(None);
        };

        let blob: CartBlob = serde_json::from_slice(&bytes)?;

        if blob.version != CART_BLOB_VERSION {
            return Err(PersistenceError::Version(blob.version));
        }

        Ok(Some(blob.lines))
    }

    /// Write the whole cart. Called with the lock held.
    fn persist(&self, cart: &Cart) {
        if let Err(err) = self.write_blob(cart) {
            warn!(key = %self.key, error = %err, "failed to persist cart");
        }
    }

    fn write_blob(&self, cart: &Cart) -> Result<(), PersistenceError> {
        let blob = CartBlobRef {
            version: CART_BLOB_VERSION,
            lines: cart.iter().collect(),
        };

        let bytes = serde_json::to_vec(&blob)?;

        self.store.save_blob(&self.key, &bytes)?;

        Ok(())
    }
}
