//! Command line configuration

use std::path::PathBuf;

use clap::Args;
use rusty_money::iso::{self, Currency};

use crate::cli::CliError;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Cart storage and display settings.
#[derive(Debug, Args)]
pub(crate) struct CartConfig {
    /// Directory holding the persisted cart
    #[arg(long, env = "CART_STORE_DIR", default_value = ".storefront", global = true)]
    pub store_dir: PathBuf,

    /// Key the cart blob is stored under
    #[arg(long, env = "CART_BLOB_KEY", default_value = "cart", global = true)]
    pub blob_key: String,

    /// ISO 4217 currency used to display subtotals
    #[arg(long, env = "CART_CURRENCY", default_value = "GBP", global = true)]
    pub currency: String,
}

impl CartConfig {
    /// Resolve the configured currency code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not a known ISO currency.
    pub fn currency(&self) -> Result<&'static Currency, CliError> {
        iso::find(&self.currency.to_uppercase())
            .ok_or_else(|| CliError::UnknownCurrency(self.currency.clone()))
    }
}

/// All global settings.
#[derive(Debug, Args)]
pub(crate) struct Config {
    #[command(flatten)]
    pub cart: CartConfig,

    #[command(flatten)]
    pub logging: LoggingConfig,
}
