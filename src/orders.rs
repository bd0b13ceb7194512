//! Order Reconciliation
//!
//! Compares the earliest and latest status snapshots of an order and reports
//! the products whose quantity went down, i.e. goods returned by the customer
//! or withdrawn by the store.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ids::ProductId;

/// One product line inside an order status snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotProduct {
    /// Product
    pub product_id: ProductId,

    /// Ordered quantity at the time of the snapshot
    pub quantity: u32,

    /// Unit price at the time of the snapshot
    pub price: Decimal,
}

impl SnapshotProduct {
    /// Create a snapshot product line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32, price: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }
}

/// A point-in-time record of an order's product quantities.
///
/// Both fields are optional because snapshots arrive from a remote service;
/// a snapshot missing either is skipped during reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusSnapshot {
    /// Products and their quantities
    #[serde(default)]
    pub products: Option<Vec<SnapshotProduct>>,

    /// When the snapshot was taken
    #[serde(default)]
    pub date: Option<Timestamp>,
}

impl OrderStatusSnapshot {
    /// Create a well-formed snapshot.
    pub fn new(date: Timestamp, products: impl Into<Vec<SnapshotProduct>>) -> Self {
        Self {
            products: Some(products.into()),
            date: Some(date),
        }
    }

    fn parts(&self) -> Option<(Timestamp, &[SnapshotProduct])> {
        Some((self.date?, self.products.as_deref()?))
    }
}

/// A product whose quantity decreased between the first and last snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnedLine {
    /// Product
    pub product_id: ProductId,

    /// Quantity in the earliest snapshot
    pub original_quantity: u32,

    /// Quantity in the latest snapshot
    pub current_quantity: u32,

    /// `original_quantity - current_quantity`, always positive
    pub returned_quantity: u32,

    /// `returned_quantity` valued at the earliest snapshot's unit price
    pub returned_value: Decimal,
}

/// Compute returned lines across a set of snapshots of one order.
///
/// Malformed snapshots are ignored. With fewer than two usable snapshots the
/// result is empty. Snapshots are ordered by date (ties keep their input
/// order) and only the earliest and latest are compared, matching products by
/// id. Output follows the product order of the earliest snapshot.
///
/// Products present in the earliest snapshot but missing from the latest one
/// are not reported.
pub fn reconcile(snapshots: &[OrderStatusSnapshot]) -> Vec<ReturnedLine> {
    let mut valid: Vec<(Timestamp, &[SnapshotProduct])> = snapshots
        .iter()
        .filter_map(OrderStatusSnapshot::parts)
        .collect();

    let skipped = snapshots.len() - valid.len();
    if skipped > 0 {
        debug!(skipped, "ignoring malformed order snapshots");
    }

    if valid.len() < 2 {
        return Vec::new();
    }

    valid.sort_by_key(|(date, _)| *date);

    let (Some((_, first)), Some((_, last))) = (valid.first(), valid.last()) else {
        return Vec::new();
    };

    returned_between(first, last)
}

/// Compare two product lists directly, `first` being the older one.
pub fn returned_between(
    first: &[SnapshotProduct],
    last: &[SnapshotProduct],
) -> Vec<ReturnedLine> {
    // First occurrence wins if a product is listed twice.
    let mut current = FxHashMap::default();

    for product in last {
        current.entry(&product.product_id).or_insert(product);
    }

    first
        .iter()
        .filter_map(|original| {
            let now = current.get(&original.product_id)?;

            let returned_quantity = original.quantity.checked_sub(now.quantity)?;
            if returned_quantity == 0 {
                return None;
            }

            let Some(returned_value) =
                Decimal::from(returned_quantity).checked_mul(original.price)
            else {
                debug!(
                    product = %original.product_id,
                    returned_quantity,
                    "ignoring returned product with an unrepresentable value"
                );
                return None;
            };

            Some(ReturnedLine {
                product_id: original.product_id.clone(),
                original_quantity: original.quantity,
                current_quantity: now.quantity,
                returned_quantity,
                returned_value,
            })
        })
        .collect()
}

/// Total value of a set of returned lines, or `None` if it overflows.
pub fn returned_total(lines: &[ReturnedLine]) -> Option<Decimal> {
    lines
        .iter()
        .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.returned_value))
}
