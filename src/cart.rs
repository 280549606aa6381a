//! Cart session

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::{Product, ProductKey},
    items::{PricedComponent, TotalPriceError, total_price},
};

/// Errors related to cart mutation.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A product's currency differs from the cart currency.
    #[error("product priced in {0}, but cart is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The requested quantity exceeds the stock on hand.
    ///
    /// Advisory only: the guard compares against the caller-supplied product
    /// record, not a reservation, so concurrent carts can still race for the
    /// same stock. The availability check at confirm time is the real gate.
    #[error("requested {requested} units, but only {available} in stock")]
    InsufficientStock {
        /// Total quantity the cart would hold after the mutation.
        requested: u32,
        /// Stock on hand at the time of the mutation.
        available: u32,
    },

    /// Quantity must be at least one.
    #[error("quantity must be at least one")]
    ZeroQuantity,

    /// No cart line exists for the given product.
    #[error("no cart line for the given product")]
    LineNotFound,
}

/// One product entry in the cart.
///
/// Name, category and unit price are snapshotted at add time; later catalog
/// changes do not reach back into the cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    product: ProductKey,
    name: String,
    category: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Returns the product key the line refers to.
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the product name snapshotted at add time.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the product category snapshotted at add time.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the unit price snapshotted at add time.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity of the line.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Calculates `unit_price * quantity` for the line.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the product leaves the minor-unit
    /// range.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        PricedComponent::new(self.name.clone(), self.unit_price, self.quantity).line_total()
    }
}

/// The mutable ledger for one in-progress sale.
///
/// Lines are ordered by first add and unique per product; adding a product
/// that is already present increments the existing line. The session lives
/// for exactly one sale: created empty, mutated, then cleared on submission
/// or cancel.
#[derive(Debug)]
pub struct CartSession<'a> {
    lines: Vec<CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> CartSession<'a> {
    /// Create a new empty cart session in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// If the product is already in the cart its line is incremented;
    /// otherwise a new line is appended with the unit price snapshotted from
    /// the product at this instant. The mutation is rejected, leaving the
    /// cart unchanged, if the resulting quantity would exceed the product's
    /// stock.
    ///
    /// # Errors
    ///
    /// - [`CartError::ZeroQuantity`]: `quantity` was zero.
    /// - [`CartError::CurrencyMismatch`]: the product is priced in a
    ///   different currency than the cart.
    /// - [`CartError::InsufficientStock`]: the resulting quantity would
    ///   exceed `product.stock_quantity`.
    pub fn add_item(
        &mut self,
        key: ProductKey,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let current = self
            .lines
            .iter()
            .find(|line| line.product == key)
            .map_or(0, |line| line.quantity);

        let requested = current.saturating_add(quantity);

        if requested > product.stock_quantity {
            return Err(CartError::InsufficientStock {
                requested,
                available: product.stock_quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.product == key) {
            line.quantity = requested;
        } else {
            self.lines.push(CartLine {
                product: key,
                name: product.name.clone(),
                category: product.category.clone(),
                unit_price: product.price,
                quantity,
            });
        }

        Ok(())
    }

    /// Replace the quantity of an existing line.
    ///
    /// A quantity of zero removes the line, matching [`Self::remove_item`]
    /// semantics (including the no-op on an absent product). Positive
    /// quantities are re-validated against the product's stock, the same
    /// guard [`Self::add_item`] applies. Repeated calls with the same
    /// quantity are idempotent; the last write wins.
    ///
    /// # Errors
    ///
    /// - [`CartError::LineNotFound`]: no line exists for the product and the
    ///   new quantity is positive.
    /// - [`CartError::InsufficientStock`]: the new quantity exceeds
    ///   `product.stock_quantity`; the line keeps its previous quantity.
    pub fn set_quantity(
        &mut self,
        key: ProductKey,
        product: &Product<'a>,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove_item(key);

            return Ok(());
        }

        let Some(line) = self.lines.iter_mut().find(|line| line.product == key) else {
            return Err(CartError::LineNotFound);
        };

        if quantity > product.stock_quantity {
            return Err(CartError::InsufficientStock {
                requested: quantity,
                available: product.stock_quantity,
            });
        }

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a line from the cart. No-op if the product is not present.
    pub fn remove_item(&mut self, key: ProductKey) {
        self.lines.retain(|line| line.product != key);
    }

    /// Empty the cart. Called after successful submission or explicit cancel.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Look up the line for a product.
    pub fn line(&self, key: ProductKey) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|line| line.product == key)
    }

    /// The lines currently in the cart, in first-add order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Lower the cart lines to priced components for the pricing engine.
    #[must_use]
    pub fn components(&self) -> Vec<PricedComponent<'a>> {
        self.lines
            .iter()
            .map(|line| PricedComponent::new(line.name.clone(), line.unit_price, line.quantity))
            .collect()
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if there was a money arithmetic or
    /// overflow error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        total_price(&self.components())
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::catalog::Catalog;

    use super::*;

    fn frame<'a>() -> Product<'a> {
        Product {
            name: "Aviator Frame".to_string(),
            category: "frames".to_string(),
            price: Money::from_minor(10000, GBP),
            stock_quantity: 5,
        }
    }

    fn cloth<'a>() -> Product<'a> {
        Product {
            name: "Lens Cloth".to_string(),
            category: "accessories".to_string(),
            price: Money::from_minor(5000, GBP),
            stock_quantity: 1,
        }
    }

    #[test]
    fn add_item_appends_new_line_with_snapshot() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);

        cart.add_item(key, catalog.get(key).ok_or("missing product")?, 1)?;

        let line = cart.line(key).ok_or("missing line")?;

        assert_eq!(line.name(), "Aviator Frame");
        assert_eq!(line.unit_price(), &Money::from_minor(10000, GBP));
        assert_eq!(line.quantity(), 1);

        Ok(())
    }

    #[test]
    fn add_item_twice_increments_existing_line() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.add_item(key, product, 1)?;
        cart.add_item(key, product, 2)?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(key).ok_or("missing line")?.quantity(), 3);

        Ok(())
    }

    #[test]
    fn add_item_price_snapshot_survives_catalog_change() -> TestResult {
        let mut product = frame();
        let key = ProductKey::default();
        let mut cart = CartSession::new(GBP);

        cart.add_item(key, &product, 1)?;

        product.price = Money::from_minor(99999, GBP);

        assert_eq!(
            cart.line(key).ok_or("missing line")?.unit_price(),
            &Money::from_minor(10000, GBP)
        );

        Ok(())
    }

    #[test]
    fn add_item_beyond_stock_is_rejected_and_cart_unchanged() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(cloth());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.add_item(key, product, 1)?;

        let result = cart.add_item(key, product, 1);

        assert_eq!(
            result,
            Err(CartError::InsufficientStock {
                requested: 2,
                available: 1,
            })
        );
        assert_eq!(cart.line(key).ok_or("missing line")?.quantity(), 1);

        Ok(())
    }

    #[test]
    fn add_item_zero_quantity_is_rejected() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);

        let result = cart.add_item(key, catalog.get(key).ok_or("missing product")?, 0);

        assert_eq!(result, Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_item_currency_mismatch_is_rejected() {
        let mut catalog = Catalog::new();

        let key = catalog.insert(Product {
            name: "Import Frame".to_string(),
            category: "frames".to_string(),
            price: Money::from_minor(10000, USD),
            stock_quantity: 5,
        });

        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).expect("missing product");

        let result = cart.add_item(key, product, 1);

        assert_eq!(
            result,
            Err(CartError::CurrencyMismatch(
                USD.iso_alpha_code,
                GBP.iso_alpha_code,
            ))
        );
    }

    #[test]
    fn set_quantity_replaces_and_is_idempotent() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.add_item(key, product, 1)?;
        cart.set_quantity(key, product, 4)?;
        cart.set_quantity(key, product, 4)?;

        assert_eq!(cart.line(key).ok_or("missing line")?.quantity(), 4);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn set_quantity_zero_removes_line() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.add_item(key, product, 2)?;
        cart.set_quantity(key, product, 0)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn set_quantity_revalidates_stock() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.add_item(key, product, 2)?;

        let result = cart.set_quantity(key, product, 6);

        assert_eq!(
            result,
            Err(CartError::InsufficientStock {
                requested: 6,
                available: 5,
            })
        );
        assert_eq!(cart.line(key).ok_or("missing line")?.quantity(), 2);

        Ok(())
    }

    #[test]
    fn set_quantity_missing_line_returns_error() {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).expect("missing product");

        let result = cart.set_quantity(key, product, 1);

        assert_eq!(result, Err(CartError::LineNotFound));
    }

    #[test]
    fn set_quantity_zero_on_absent_product_is_noop() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);
        let product = catalog.get(key).ok_or("missing product")?;

        cart.set_quantity(key, product, 0)?;

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn remove_item_deletes_line_and_ignores_absent() -> TestResult {
        let mut catalog = Catalog::new();
        let frame_key = catalog.insert(frame());
        let cloth_key = catalog.insert(cloth());
        let mut cart = CartSession::new(GBP);

        cart.add_item(frame_key, catalog.get(frame_key).ok_or("missing product")?, 1)?;

        cart.remove_item(frame_key);
        cart.remove_item(cloth_key);

        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn clear_empties_the_cart() -> TestResult {
        let mut catalog = Catalog::new();
        let key = catalog.insert(frame());
        let mut cart = CartSession::new(GBP);

        cart.add_item(key, catalog.get(key).ok_or("missing product")?, 2)?;
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal()?, Money::from_minor(0, GBP));

        Ok(())
    }

    #[test]
    fn subtotal_is_recomputed_from_current_lines() -> TestResult {
        let mut catalog = Catalog::new();
        let frame_key = catalog.insert(frame());
        let cloth_key = catalog.insert(cloth());
        let mut cart = CartSession::new(GBP);

        cart.add_item(frame_key, catalog.get(frame_key).ok_or("missing product")?, 2)?;
        cart.add_item(cloth_key, catalog.get(cloth_key).ok_or("missing product")?, 1)?;

        assert_eq!(cart.subtotal()?, Money::from_minor(25000, GBP));

        cart.remove_item(cloth_key);

        assert_eq!(cart.subtotal()?, Money::from_minor(20000, GBP));

        Ok(())
    }

    #[test]
    fn components_preserve_line_order() -> TestResult {
        let mut catalog = Catalog::new();
        let frame_key = catalog.insert(frame());
        let cloth_key = catalog.insert(cloth());
        let mut cart = CartSession::new(GBP);

        cart.add_item(frame_key, catalog.get(frame_key).ok_or("missing product")?, 1)?;
        cart.add_item(cloth_key, catalog.get(cloth_key).ok_or("missing product")?, 1)?;

        let components = cart.components();
        let labels: Vec<String> = components
            .iter()
            .map(|component| component.label().to_string())
            .collect();

        assert_eq!(labels, vec!["Aviator Frame", "Lens Cloth"]);

        Ok(())
    }
}
