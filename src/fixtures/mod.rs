//! Fixtures
//!
//! Named YAML data sets for carts and order histories, used by tests and the
//! command line tools.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::CartError,
    engine::CartEngine,
    lines::NewCartLine,
    orders::OrderStatusSnapshot,
    storage::MemoryBlobStore,
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A fixture line was refused by the cart
    #[error("Invalid cart line in fixture: {0}")]
    Cart(#[from] CartError),
}

#[derive(Debug, Deserialize)]
struct CartFixture {
    lines: Vec<NewCartLine>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderFixture {
    Wrapped { snapshots: Vec<OrderStatusSnapshot> },
    Bare(Vec<OrderStatusSnapshot>),
}

impl From<OrderFixture> for Vec<OrderStatusSnapshot> {
    fn from(fixture: OrderFixture) -> Self {
        match fixture {
            OrderFixture::Wrapped { snapshots } | OrderFixture::Bare(snapshots) => snapshots,
        }
    }
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a fixture reader with the default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a fixture reader with a custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Load the cart lines of a named cart fixture (`carts/<name>.yml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&self, name: &str) -> Result<Vec<NewCartLine>, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        Ok(fixture.lines)
    }

    /// Load the snapshots of a named order fixture (`orders/<name>.yml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_order(&self, name: &str) -> Result<Vec<OrderStatusSnapshot>, FixtureError> {
        read_snapshots(self.base_path.join("orders").join(format!("{name}.yml")))
    }

    /// Build an in-memory cart engine holding a named cart fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture cannot be loaded or a line is refused.
    pub fn engine(&self, name: &str) -> Result<CartEngine<MemoryBlobStore>, FixtureError> {
        let engine = CartEngine::new(MemoryBlobStore::new());

        for line in self.load_cart(name)? {
            engine.add(line)?;
        }

        Ok(engine)
    }
}

/// Read order snapshots from a JSON (`.json`) or YAML (anything else) file.
///
/// The document is either a list of snapshots or a map with a `snapshots` list.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_snapshots(path: impl AsRef<Path>) -> Result<Vec<OrderStatusSnapshot>, FixtureError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let fixture: OrderFixture = if path.extension() == Some(OsStr::new("json")) {
        serde_json::from_str(&contents)?
    } else {
        serde_norway::from_str(&contents)?
    };

    Ok(fixture.into())
}
