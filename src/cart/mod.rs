//! Cart

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::{
    ids::{StockId, StoreId},
    lines::{BuyingMode, CartLine, NewCartLine, ShippingAddress},
    pricing::total_price,
};

new_key_type! {
    /// Cart Line Key
    pub struct LineKey;
}

/// Errors for cart commands the cart refuses to apply.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line quantity of zero was requested. Lines are removed explicitly.
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,

    /// A box-mode quantity is not a whole number of boxes.
    #[error("quantity {quantity} is not a multiple of the box size {box_items}")]
    NotBoxMultiple {
        /// Requested quantity
        quantity: u32,

        /// Units per box
        box_items: NonZeroU32,
    },

    /// Merging would take the line quantity past `u32::MAX`.
    #[error("merged quantity exceeds the maximum line quantity")]
    QuantityOverflow,

    /// Merging would take the line price past the largest representable amount.
    #[error("merged price exceeds the largest representable amount")]
    PriceOverflow,
}

/// In-memory cart: lines held in an arena, indexed by store then stock.
///
/// Insertion order is kept separately so reads are stable across removals.
#[derive(Debug, Default, Clone)]
pub struct Cart {
    lines: SlotMap<LineKey, CartLine>,
    index: FxHashMap<StoreId, FxHashMap<StockId, LineKey>>,
    order: Vec<LineKey>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from previously persisted lines.
    ///
    /// Lines with a zero quantity are dropped. Repeated pairs are merged with
    /// the same rules as [`Cart::add`]; a repeat that cannot be merged is
    /// dropped and logged.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();

        for line in lines {
            if line.quantity == 0 {
                continue;
            }

            let address = line.shipping_address.clone();
            let inserted = cart.insert(NewCartLine {
                stock_id: line.stock_id,
                store_id: line.store_id,
                quantity: line.quantity,
                price: line.price,
                buying_mode: line.buying_mode,
                box_items: line.box_items,
                product: line.product,
            });

            let key = match inserted {
                Ok(key) => key,
                Err(err) => {
                    warn!(error = %err, "dropping stored line that cannot be merged");
                    continue;
                }
            };

            if let Some(stored) = cart.lines.get_mut(key)
                && stored.shipping_address.is_none()
            {
                stored.shipping_address = address;
            }
        }

        cart
    }

    /// Add a line, merging it into an existing line for the same pair.
    ///
    /// Returns the key of the line that now holds the addition.
    ///
    /// # Errors
    ///
    /// - [`CartError::NonPositiveQuantity`]: the quantity is zero.
    /// - [`CartError::NotBoxMultiple`]: the line, or the merged line, is in box
    ///   mode and its quantity is not a whole number of boxes.
    /// - [`CartError::QuantityOverflow`] / [`CartError::PriceOverflow`]: the
    ///   merged line cannot be represented.
    ///
    /// A refused command leaves the cart unchanged.
    pub fn add(&mut self, line: NewCartLine) -> Result<LineKey, CartError> {
        check_quantity(line.quantity, line.buying_mode, line.box_items)?;

        self.insert(line)
    }

    /// Replace the quantity and price of an existing line.
    ///
    /// Returns `Ok(false)` when no line matches the pair.
    ///
    /// # Errors
    ///
    /// - [`CartError::NonPositiveQuantity`]: the quantity is zero.
    /// - [`CartError::NotBoxMultiple`]: the line is in box mode and the quantity is not a whole number of boxes.
    pub fn update_quantity(
        &mut self,
        stock: &StockId,
        store: &StoreId,
        quantity: u32,
        price: Decimal,
    ) -> Result<bool, CartError> {
        if quantity == 0 {
            return Err(CartError::NonPositiveQuantity);
        }

        let Some(line) = self
            .key_of(stock, store)
            .and_then(|key| self.lines.get_mut(key))
        else {
            return Ok(false);
        };

        check_quantity(quantity, line.buying_mode, line.box_items)?;

        line.quantity = quantity;
        line.price = price;

        Ok(true)
    }

    /// Remove a single line, returning it if it existed.
    pub fn remove(&mut self, stock: &StockId, store: &StoreId) -> Option<CartLine> {
        let stocks = self.index.get_mut(store)?;
        let key = stocks.remove(stock)?;

        if stocks.is_empty() {
            self.index.remove(store);
        }

        self.order.retain(|candidate| *candidate != key);
        self.lines.remove(key)
    }

    /// Remove every line of a store, returning them in cart order.
    pub fn remove_store(&mut self, store: &StoreId) -> Vec<CartLine> {
        let Some(stocks) = self.index.remove(store) else {
            return Vec::new();
        };

        let mut removed = Vec::with_capacity(stocks.len());
        let lines = &mut self.lines;

        self.order.retain(|key| {
            if lines.get(*key).is_some_and(|line| &line.store_id == store) {
                removed.extend(lines.remove(*key));
                false
            } else {
                true
            }
        });

        removed
    }

    /// Set the shipping address on every line of a store.
    ///
    /// Returns the number of lines updated.
    pub fn assign_address(&mut self, store: &StoreId, address: &ShippingAddress) -> usize {
        let Some(stocks) = self.index.get(store) else {
            return 0;
        };

        let mut updated = 0;

        for key in stocks.values() {
            if let Some(line) = self.lines.get_mut(*key) {
                line.shipping_address = Some(address.clone());
                updated += 1;
            }
        }

        updated
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.index.clear();
        self.order.clear();
    }

    /// Look up a line by key.
    pub fn line(&self, key: LineKey) -> Option<&CartLine> {
        self.lines.get(key)
    }

    /// Look up the line for a pair.
    pub fn get(&self, stock: &StockId, store: &StoreId) -> Option<&CartLine> {
        self.key_of(stock, store).and_then(|key| self.lines.get(key))
    }

    /// Iterate over all lines in the order they were first added.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.order.iter().filter_map(|key| self.lines.get(*key))
    }

    /// Iterate over a store's lines in cart order.
    pub fn lines_for_store<'a>(
        &'a self,
        store: &'a StoreId,
    ) -> impl Iterator<Item = &'a CartLine> + 'a {
        self.iter().filter(move |line| &line.store_id == store)
    }

    /// Number of lines belonging to a store.
    pub fn line_count_for_store(&self, store: &StoreId) -> usize {
        self.index.get(store).map_or(0, FxHashMap::len)
    }

    /// Sum of a store's line prices, rounded once to two decimal places.
    pub fn subtotal_for_store(&self, store: &StoreId) -> Decimal {
        total_price(self.lines_for_store(store))
    }

    /// Stores with at least one line, in order of first appearance.
    pub fn store_ids(&self) -> SmallVec<[StoreId; 4]> {
        let mut stores = SmallVec::<[StoreId; 4]>::new();

        for line in self.iter() {
            if !stores.contains(&line.store_id) {
                stores.push(line.store_id.clone());
            }
        }

        stores
    }

    /// Total unit count across every line.
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn key_of(&self, stock: &StockId, store: &StoreId) -> Option<LineKey> {
        self.index.get(store)?.get(stock).copied()
    }

    /// Merge or append. Only the merged result is validated.
    fn insert(&mut self, line: NewCartLine) -> Result<LineKey, CartError> {
        if let Some(key) = self.key_of(&line.stock_id, &line.store_id)
            && let Some(existing) = self.lines.get_mut(key)
        {
            existing.absorb(line)?;
            return Ok(key);
        }

        let store_address = self
            .index
            .get(&line.store_id)
            .and_then(|stocks| stocks.values().find_map(|key| self.lines.get(*key)))
            .and_then(|sibling| sibling.shipping_address.clone());

        let store = line.store_id.clone();
        let stock = line.stock_id.clone();

        let mut line = CartLine::from(line);
        line.shipping_address = store_address;

        let key = self.lines.insert(line);

        self.index.entry(store).or_default().insert(stock, key);
        self.order.push(key);

        Ok(key)
    }
}

pub(crate) fn check_quantity(
    quantity: u32,
    mode: BuyingMode,
    box_items: Option<NonZeroU32>,
) -> Result<(), CartError> {
    if quantity == 0 {
        return Err(CartError::NonPositiveQuantity);
    }

    match (mode, box_items) {
        (BuyingMode::Box, Some(box_items)) if quantity % box_items.get() != 0 => {
            Err(CartError::NotBoxMultiple {
                quantity,
                box_items,
            })
        }
        _ => Ok(()),
    }
}
