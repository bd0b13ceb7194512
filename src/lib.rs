//! Storefront Cart
//!
//! Storefront Cart is the client-side cart engine of a multi-store storefront:
//! it merges cart lines per stock offer and store, keeps per-store totals and
//! shipping addresses, persists the cart as a key-value blob and reconciles
//! order status snapshots into returned items.

pub mod cart;
pub mod engine;
pub mod fixtures;
pub mod ids;
pub mod lines;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod storage;
