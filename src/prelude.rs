//! Storefront Cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, LineKey},
    engine::{CART_BLOB_KEY, CartEngine, StoreSummary},
    fixtures::{Fixture, FixtureError, read_snapshots},
    ids::{AddressId, ProductId, StockId, StoreId},
    lines::{BuyingMode, CartLine, NewCartLine, ProductSnapshot, ShippingAddress},
    orders::{
        OrderStatusSnapshot, ReturnedLine, SnapshotProduct, reconcile, returned_between,
        returned_total,
    },
    pricing::{round_total, total_price},
    storage::{BlobStore, FileBlobStore, MemoryBlobStore, StorageError},
};
