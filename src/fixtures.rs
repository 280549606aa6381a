//! Fixtures

use std::{fs, path::PathBuf};

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Catalog, Product, ProductKey};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product category
    pub category: String,

    /// Product price (e.g., "89.99 GBP")
    pub price: String,

    /// Units on hand
    pub stock: u32,
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product {
            name: fixture.name,
            category: fixture.category,
            price: Money::from_minor(minor_units, currency),
            stock_quantity: fixture.stock,
        })
    }
}

/// Loads YAML product catalogs for tests and embedding hosts.
#[derive(Debug)]
pub struct CatalogFixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Catalog<'a>,

    /// String key -> catalog key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> CatalogFixture<'a> {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            product_keys: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file into the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if there are
    /// currency mismatches between products.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let (_minor_units, currency) = parse_price(&product_fixture.price)?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product: Product<'a> = product_fixture.try_into()?;
            let product_key = self.catalog.insert(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load a fixture set by name from the default base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self
            .product_keys
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))?;

        self.catalog
            .get(*product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get the loaded catalog
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for CatalogFixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse price string (e.g., "2.99 GBP") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, name: &str, contents: &str) -> TestResult {
        let dir = base.join("products");

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_products_into_catalog() -> TestResult {
        let fixture = CatalogFixture::from_set("optical")?;

        let frame = fixture.product("aviator-frame")?;

        assert_eq!(frame.name, "Aviator Frame");
        assert_eq!(frame.price.to_minor_units(), 8999);
        assert_eq!(frame.stock_quantity, 12);
        assert_eq!(fixture.currency()?, GBP);
        assert!(fixture.catalog().len() >= 4, "expected the full set");

        Ok(())
    }

    #[test]
    fn fixture_product_key_resolves_into_catalog() -> TestResult {
        let fixture = CatalogFixture::from_set("optical")?;

        let key = fixture.product_key("lens-cloth")?;
        let product = fixture.catalog().get(key).ok_or("missing product")?;

        assert_eq!(product.category, "accessories");

        Ok(())
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = CatalogFixture::new();
        let result = fixture.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = CatalogFixture::new();
        let result = fixture.currency();

        assert!(matches!(result, Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_load_products_rejects_currency_mismatch() -> TestResult {
        let base = tempfile::tempdir()?;

        write_fixture(
            base.path(),
            "usd_set",
            "products:\n  drops:\n    name: Eye Drops\n    category: care\n    price: 4.00 USD\n    stock: 10\n",
        )?;

        write_fixture(
            base.path(),
            "gbp_set",
            "products:\n  spray:\n    name: Cleaning Spray\n    category: care\n    price: 3.00 GBP\n    stock: 10\n",
        )?;

        let mut fixture = CatalogFixture::with_base_path(base.path());

        fixture.load_products("usd_set")?;

        let result = fixture.load_products("gbp_set");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn fixture_missing_file_returns_io_error() {
        let base = std::env::temp_dir().join("till-no-such-fixture-dir");
        let mut fixture = CatalogFixture::with_base_path(base);

        let result = fixture.load_products("missing");

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99GBP");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_usd_and_eur() -> TestResult {
        let (usd_minor, usd) = parse_price("1.00 USD")?;
        let (eur_minor, eur) = parse_price("2.50 EUR")?;

        assert_eq!(usd_minor, 100);
        assert_eq!(usd, USD);
        assert_eq!(eur_minor, 250);
        assert_eq!(eur, EUR);

        Ok(())
    }

    #[test]
    fn parse_price_rounds_to_minor_units() -> TestResult {
        let (minor, _) = parse_price("4.999 GBP")?;

        assert_eq!(minor, 500);

        Ok(())
    }
}
