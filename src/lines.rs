//! Cart Lines

use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{CartError, check_quantity},
    ids::{AddressId, StockId, StoreId},
};

/// How a line's quantity is counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyingMode {
    /// Individual units.
    #[default]
    Unit,

    /// Whole boxes of `box_items` units.
    Box,
}

impl BuyingMode {
    /// Combine the modes of two merged lines. `Unit` wins over `Box`.
    #[must_use]
    pub fn merge(self, other: BuyingMode) -> BuyingMode {
        if self == BuyingMode::Unit || other == BuyingMode::Unit {
            BuyingMode::Unit
        } else {
            BuyingMode::Box
        }
    }
}

/// Display data captured when the line was added. Never refreshed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product name
    pub name: String,

    /// Brand name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Image reference (URL or asset key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A shipping address reference shared by every line of a store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Address identifier
    pub id: AddressId,

    /// Human readable label, e.g. "Home"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ShippingAddress {
    /// Creates an address reference without a label.
    pub fn new(id: impl Into<AddressId>) -> Self {
        Self {
            id: id.into(),
            label: None,
        }
    }

    /// Creates an address reference with a label.
    pub fn labelled(id: impl Into<AddressId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: Some(label.into()),
        }
    }
}

/// A request to add a stock offer to the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewCartLine {
    /// Stock offer being added
    pub stock_id: StockId,

    /// Store selling the offer
    pub store_id: StoreId,

    /// Quantity to add, in the buying mode's unit
    pub quantity: u32,

    /// Price of the added quantity
    pub price: Decimal,

    /// Buying mode requested for this addition
    #[serde(default)]
    pub buying_mode: BuyingMode,

    /// Units per box, when the offer is sold in boxes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_items: Option<NonZeroU32>,

    /// Display data for the product
    #[serde(default)]
    pub product: ProductSnapshot,
}

impl NewCartLine {
    /// Creates a unit-mode line request with an empty product snapshot.
    pub fn new(
        stock_id: impl Into<StockId>,
        store_id: impl Into<StoreId>,
        quantity: u32,
        price: Decimal,
    ) -> Self {
        Self {
            stock_id: stock_id.into(),
            store_id: store_id.into(),
            quantity,
            price,
            buying_mode: BuyingMode::Unit,
            box_items: None,
            product: ProductSnapshot::default(),
        }
    }

    /// Switches the request to box mode with the given box size.
    #[must_use]
    pub fn in_boxes(mut self, box_items: NonZeroU32) -> Self {
        self.buying_mode = BuyingMode::Box;
        self.box_items = Some(box_items);
        self
    }

    /// Attaches product display data.
    #[must_use]
    pub fn with_product(mut self, product: ProductSnapshot) -> Self {
        self.product = product;
        self
    }
}

/// One stock offer in the cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Stock offer
    pub stock_id: StockId,

    /// Owning store
    pub store_id: StoreId,

    /// Quantity, always greater than zero
    pub quantity: u32,

    /// Price for the current quantity
    pub price: Decimal,

    /// Active buying mode
    pub buying_mode: BuyingMode,

    /// Units per box, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_items: Option<NonZeroU32>,

    /// Display data captured at add-time
    pub product: ProductSnapshot,

    /// Shipping address shared by the store's lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<ShippingAddress>,
}

impl CartLine {
    /// Returns the `(stock, store)` pair identifying this line.
    pub fn pair(&self) -> (&StockId, &StoreId) {
        (&self.stock_id, &self.store_id)
    }

    /// Folds another addition of the same pair into this line.
    ///
    /// The merged line is validated before anything changes, so a refused
    /// merge leaves the line as it was.
    pub(crate) fn absorb(&mut self, incoming: NewCartLine) -> Result<(), CartError> {
        let quantity = self
            .quantity
            .checked_add(incoming.quantity)
            .ok_or(CartError::QuantityOverflow)?;
        let price = self
            .price
            .checked_add(incoming.price)
            .ok_or(CartError::PriceOverflow)?;
        let buying_mode = self.buying_mode.merge(incoming.buying_mode);
        let box_items = self.box_items.or(incoming.box_items);

        check_quantity(quantity, buying_mode, box_items)?;

        self.quantity = quantity;
        self.price = price;
        self.buying_mode = buying_mode;
        self.box_items = box_items;

        Ok(())
    }
}

impl From<NewCartLine> for CartLine {
    fn from(line: NewCartLine) -> Self {
        Self {
            stock_id: line.stock_id,
            store_id: line.store_id,
            quantity: line.quantity,
            price: line.price,
            buying_mode: line.buying_mode,
            box_items: line.box_items,
            product: line.product,
            shipping_address: None,
        }
    }
}
