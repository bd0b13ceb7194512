use std::{io, num::NonZeroU32};

use clap::Args;
use rust_decimal::Decimal;
use storefront_cart::prelude::*;

use super::CliError;

#[derive(Debug, Args)]
pub(crate) struct LineArgs {
    /// Stock (SKU) identifier
    #[arg(long)]
    stock: String,

    /// Store identifier
    #[arg(long)]
    store: String,
}

impl LineArgs {
    fn ids(self) -> (StockId, StoreId) {
        (StockId::from(self.stock), StoreId::from(self.store))
    }
}

#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// Store identifier
    #[arg(long)]
    store: String,
}

#[derive(Debug, Args)]
pub(crate) struct AddArgs {
    #[command(flatten)]
    line: LineArgs,

    /// Quantity in units
    #[arg(long)]
    quantity: u32,

    /// Price for the whole quantity
    #[arg(long)]
    price: Decimal,

    /// Units per box; switches the line to box mode
    #[arg(long)]
    box_items: Option<NonZeroU32>,

    /// Product name shown in listings
    #[arg(long)]
    name: Option<String>,

    /// Product brand
    #[arg(long)]
    brand: Option<String>,

    /// Product image URL
    #[arg(long)]
    image: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateArgs {
    #[command(flatten)]
    line: LineArgs,

    /// New quantity in units
    #[arg(long)]
    quantity: u32,

    /// New price for the whole quantity
    #[arg(long)]
    price: Decimal,
}

#[derive(Debug, Args)]
pub(crate) struct AssignAddressArgs {
    /// Store identifier
    #[arg(long)]
    store: String,

    /// Address identifier
    #[arg(long)]
    address: String,

    /// Optional address label
    #[arg(long)]
    label: Option<String>,
}

pub(crate) fn add<S: BlobStore>(
    engine: &CartEngine<S>,
    args: AddArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let (stock, store) = args.line.ids();

    let mut line = NewCartLine::new(stock.clone(), store.clone(), args.quantity, args.price)
        .with_product(ProductSnapshot {
            name: args.name.unwrap_or_else(|| stock.to_string()),
            brand: args.brand,
            image: args.image,
        });

    if let Some(box_items) = args.box_items {
        line = line.in_boxes(box_items);
    }

    engine.add(line)?;

    let quantity = engine
        .lines_for_store(&store)
        .into_iter()
        .find(|line| line.stock_id == stock)
        .map_or(0, |line| line.quantity);

    writeln!(out, "added {stock} @ {store}, quantity now {quantity}")?;

    Ok(())
}

pub(crate) fn update<S: BlobStore>(
    engine: &CartEngine<S>,
    args: UpdateArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let (stock, store) = args.line.ids();

    if !engine.update_quantity(&stock, &store, args.quantity, args.price)? {
        writeln!(out, "no line for {stock} @ {store}, nothing updated")?;
        return Ok(());
    }

    writeln!(out, "updated {stock} @ {store} to {} for {}", args.quantity, args.price)?;

    Ok(())
}

pub(crate) fn remove<S: BlobStore>(
    engine: &CartEngine<S>,
    args: LineArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let (stock, store) = args.ids();

    if engine.remove(&stock, &store).is_none() {
        writeln!(out, "no line for {stock} @ {store}, nothing removed")?;
        return Ok(());
    }

    writeln!(out, "removed {stock} @ {store}")?;

    Ok(())
}

pub(crate) fn remove_store<S: BlobStore>(
    engine: &CartEngine<S>,
    args: StoreArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let store = StoreId::from(args.store);
    let removed = engine.remove_all_for_store(&store);

    writeln!(out, "removed {} line(s) from {store}", removed.len())?;

    Ok(())
}

pub(crate) fn assign_address<S: BlobStore>(
    engine: &CartEngine<S>,
    args: AssignAddressArgs,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let store = StoreId::from(args.store);
    let address = match args.label {
        Some(label) => ShippingAddress::labelled(args.address, label),
        None => ShippingAddress::new(args.address),
    };

    let updated = engine.assign_address(&store, &address);

    writeln!(out, "assigned {} to {updated} line(s) in {store}", address.id)?;

    Ok(())
}

pub(crate) fn clear<S: BlobStore>(
    engine: &CartEngine<S>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let lines = engine.len();

    engine.clear();

    writeln!(out, "cleared {lines} line(s)")?;

    Ok(())
}
