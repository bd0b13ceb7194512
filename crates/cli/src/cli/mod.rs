use std::io;

use clap::{Parser, Subcommand};
use storefront_cart::prelude::*;
use thiserror::Error;

use crate::config::{CartConfig, Config};

mod edit;
mod reconcile;
mod report;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a line, merging with an existing line for the same stock and store
    Add(edit::AddArgs),

    /// Replace the quantity and price of a line
    Update(edit::UpdateArgs),

    /// Remove a single line
    Remove(edit::LineArgs),

    /// Remove every line of a store
    RemoveStore(edit::StoreArgs),

    /// Assign a shipping address to every line of a store
    AssignAddress(edit::AssignAddressArgs),

    /// Empty the cart
    Clear,

    /// List cart lines
    List(report::ListArgs),

    /// Show per-store subtotals
    Subtotal(report::SubtotalArgs),

    /// Report returned products from a file of order status snapshots
    Reconcile(reconcile::ReconcileArgs),
}

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Currency code not found in the ISO set
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The cart refused the command
    #[error(transparent)]
    Cart(#[from] CartError),

    /// An order snapshot file could not be read
    #[error(transparent)]
    Snapshots(#[from] FixtureError),

    /// Writing to stdout failed
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl Cli {
    pub(crate) fn run(self, out: &mut impl io::Write) -> Result<(), CliError> {
        let Self { config, command } = self;
        let cart = &config.cart;

        match command {
            Commands::Add(args) => edit::add(&open_engine(cart), args, out),
            Commands::Update(args) => edit::update(&open_engine(cart), args, out),
            Commands::Remove(args) => edit::remove(&open_engine(cart), args, out),
            Commands::RemoveStore(args) => edit::remove_store(&open_engine(cart), args, out),
            Commands::AssignAddress(args) => edit::assign_address(&open_engine(cart), args, out),
            Commands::Clear => edit::clear(&open_engine(cart), out),
            Commands::List(args) => report::list(&open_engine(cart), args.store, out),
            Commands::Subtotal(args) => {
                let currency = cart.currency()?;
                report::subtotal(&open_engine(cart), args.store, currency, out)
            }
            Commands::Reconcile(args) => reconcile::run(&args, out),
        }
    }
}

fn open_engine(config: &CartConfig) -> CartEngine<FileBlobStore> {
    let engine = CartEngine::with_key(FileBlobStore::new(&config.store_dir), &config.blob_key);

    engine.load();

    engine
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use testresult::TestResult;

    use super::*;

    fn run_in(dir: &Path, args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
        let store_dir = dir.to_string_lossy().into_owned();
        let argv = ["storefront", "--store-dir", store_dir.as_str()]
            .into_iter()
            .chain(args.iter().copied());

        let mut out = Vec::new();
        Cli::try_parse_from(argv)?.run(&mut out)?;

        Ok(String::from_utf8(out)?)
    }

    fn add_line(
        dir: &Path,
        stock: &str,
        store: &str,
        quantity: &str,
        price: &str,
    ) -> Result<String, Box<dyn std::error::Error>> {
        run_in(
            dir,
            &[
                "add",
                "--stock",
                stock,
                "--store",
                store,
                "--quantity",
                quantity,
                "--price",
                price,
            ],
        )
    }

    #[test]
    fn add_persists_between_invocations() -> TestResult {
        let dir = tempfile::tempdir()?;

        add_line(dir.path(), "s1", "A", "2", "3.00")?;
        add_line(dir.path(), "s1", "A", "1", "1.50")?;

        let listed = run_in(dir.path(), &["list"])?;
        let subtotal = run_in(dir.path(), &["subtotal", "--store", "A"])?;

        assert!(listed.contains("s1"));
        assert!(subtotal.contains("4.50"));

        Ok(())
    }

    #[test]
    fn remove_store_leaves_other_stores() -> TestResult {
        let dir = tempfile::tempdir()?;

        add_line(dir.path(), "s1", "A", "1", "1")?;
        add_line(dir.path(), "s2", "B", "1", "1")?;
        run_in(dir.path(), &["remove-store", "--store", "A"])?;

        let listed = run_in(dir.path(), &["list"])?;

        assert!(!listed.contains("s1"));
        assert!(listed.contains("s2"));

        Ok(())
    }

    #[test]
    fn missing_lines_are_reported_without_failing() -> TestResult {
        let dir = tempfile::tempdir()?;

        let updated = run_in(
            dir.path(),
            &[
                "update",
                "--stock",
                "s1",
                "--store",
                "A",
                "--quantity",
                "1",
                "--price",
                "1",
            ],
        )?;
        let removed = run_in(dir.path(), &["remove", "--stock", "s1", "--store", "A"])?;

        assert!(updated.contains("no line for s1 @ A"));
        assert!(removed.contains("no line for s1 @ A"));
        assert!(!dir.path().join("cart.blob").exists());

        Ok(())
    }

    #[test]
    fn zero_quantity_add_is_rejected() -> TestResult {
        let dir = tempfile::tempdir()?;

        let result = add_line(dir.path(), "s1", "A", "0", "1");

        assert!(result.is_err());
        assert!(!dir.path().join("cart.blob").exists());

        Ok(())
    }

    #[test]
    fn currency_is_only_needed_for_subtotals() -> TestResult {
        let dir = tempfile::tempdir()?;

        run_in(
            dir.path(),
            &[
                "--currency",
                "XYZ",
                "add",
                "--stock",
                "s1",
                "--store",
                "A",
                "--quantity",
                "1",
                "--price",
                "1",
            ],
        )?;
        run_in(dir.path(), &["--currency", "XYZ", "list"])?;

        let subtotal = run_in(dir.path(), &["--currency", "XYZ", "subtotal"]);

        assert!(subtotal.is_err());
        assert!(dir.path().join("cart.blob").exists());

        Ok(())
    }

    #[test]
    fn reconcile_does_not_touch_the_cart() -> TestResult {
        let dir = tempfile::tempdir()?;
        let snapshots = dir.path().join("order.json");

        std::fs::write(
            &snapshots,
            r#"[
                {"date": "2024-05-01T09:00:00Z", "products": [{"product_id": "rice", "quantity": 3, "price": "2.20"}]},
                {"date": "2024-05-03T09:00:00Z", "products": [{"product_id": "rice", "quantity": 1, "price": "2.20"}]}
            ]"#,
        )?;

        let report = run_in(dir.path(), &["reconcile", &snapshots.to_string_lossy()])?;

        assert!(report.contains("rice"));
        assert!(report.contains("4.40"));
        assert!(!dir.path().join("cart.blob").exists());

        Ok(())
    }
}
