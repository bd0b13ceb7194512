use std::io;

use clap::Args;
use rusty_money::iso::Currency;
use storefront_cart::{prelude::*, pricing::to_money};
use tabled::builder::Builder;

use super::CliError;
use crate::table::write_table;

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Only list lines of this store
    #[arg(long)]
    pub store: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct SubtotalArgs {
    /// Only show this store
    #[arg(long)]
    pub store: Option<String>,
}

pub(crate) fn list<S: BlobStore>(
    engine: &CartEngine<S>,
    store: Option<String>,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let lines = match store {
        Some(store) => engine.lines_for_store(&StoreId::from(store)),
        None => engine.lines(),
    };

    if lines.is_empty() {
        writeln!(out, "cart is empty")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Store", "Stock", "Product", "Mode", "Qty", "Price", "Address"]);

    for line in &lines {
        let mode = match (line.buying_mode, line.box_items) {
            (BuyingMode::Box, Some(box_items)) => format!("box of {box_items}"),
            (BuyingMode::Box, None) => "box".to_string(),
            (BuyingMode::Unit, _) => "unit".to_string(),
        };

        builder.push_record([
            line.store_id.to_string(),
            line.stock_id.to_string(),
            line.product.name.clone(),
            mode,
            line.quantity.to_string(),
            line.price.to_string(),
            line.shipping_address
                .as_ref()
                .map_or_else(String::new, address_label),
        ]);
    }

    write_table(out, builder, 4..6)?;

    Ok(())
}

fn address_label(address: &ShippingAddress) -> String {
    address
        .label
        .clone()
        .unwrap_or_else(|| address.id.to_string())
}

pub(crate) fn subtotal<S: BlobStore>(
    engine: &CartEngine<S>,
    store: Option<String>,
    currency: &'static Currency,
    out: &mut impl io::Write,
) -> Result<(), CliError> {
    let summaries = match store {
        Some(store) => {
            let store = StoreId::from(store);

            vec![StoreSummary {
                line_count: engine.line_count_for_store(&store),
                subtotal: engine.subtotal_for_store(&store),
                store_id: store,
            }]
        }
        None => engine.store_summaries(),
    };

    let mut builder = Builder::default();

    builder.push_record(["Store", "Lines", "Subtotal"]);

    for summary in &summaries {
        builder.push_record([
            summary.store_id.to_string(),
            summary.line_count.to_string(),
            to_money(summary.subtotal, currency).to_string(),
        ]);
    }

    write_table(out, builder, 1..3)?;

    Ok(())
}
