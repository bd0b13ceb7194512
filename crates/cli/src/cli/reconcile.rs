use std::{io, path::PathBuf};

use clap::Args;
use storefront_cart::prelude::*;
use tabled::builder::Builder;

use super::CliError;
use crate::table::write_table;

#[derive(Debug, Args)]
pub(crate) struct ReconcileArgs {
    /// JSON (.json) or YAML file holding the order status snapshots
    file: PathBuf,
}

pub(crate) fn run(args: &ReconcileArgs, out: &mut impl io::Write) -> Result<(), CliError> {
    let snapshots = read_snapshots(&args.file)?;
    let returned = reconcile(&snapshots);

    if returned.is_empty() {
        writeln!(out, "no returned products")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Product", "Ordered", "Current", "Returned", "Value"]);

    for line in &returned {
        builder.push_record([
            line.product_id.to_string(),
            line.original_quantity.to_string(),
            line.current_quantity.to_string(),
            line.returned_quantity.to_string(),
            line.returned_value.to_string(),
        ]);
    }

    builder.push_record([
        "Total".to_string(),
        String::new(),
        String::new(),
        String::new(),
        returned_total(&returned).map_or_else(|| "overflow".to_string(), |t| t.to_string()),
    ]);

    write_table(out, builder, 1..5)?;

    Ok(())
}
