//! Priced components

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors that can occur while totalling priced components.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// No components were provided, so currency could not be determined.
    #[error("no components provided; cannot determine currency")]
    NoComponents,

    /// A line total left the representable minor-unit range.
    #[error("line total overflowed for component {0}")]
    Overflow(String),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single priced entry in a sale.
///
/// Explicit cart lines and prescription-derived charges (lens, coatings) all
/// take this shape, so the pricing engine has one summation path.
#[derive(Clone, Debug, PartialEq)]
pub struct PricedComponent<'a> {
    label: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> PricedComponent<'a> {
    /// Creates a new component with the given label, unit price and quantity.
    pub fn new(label: impl Into<String>, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            label: label.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the display label of the component.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the unit price of the component.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the quantity of the component.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Calculates `unit_price * quantity` in checked minor-unit arithmetic.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the product leaves the
    /// minor-unit range.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| TotalPriceError::Overflow(self.label.clone()))?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Calculates the combined total of a list of components.
///
/// # Errors
///
/// - [`TotalPriceError::NoComponents`]: no components were provided, so
///   currency could not be determined.
/// - [`TotalPriceError::Overflow`]: a line total left the minor-unit range.
/// - [`TotalPriceError::Money`]: wrapped money arithmetic or currency
///   mismatch error.
pub fn total_price<'a>(
    components: &[PricedComponent<'a>],
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let first = components.first().ok_or(TotalPriceError::NoComponents)?;

    components.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, component| {
            let line = component.line_total()?;

            Ok(acc.add(line)?)
        },
    )
}
