//! Pricing engine

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::items::{PricedComponent, TotalPriceError, total_price};

/// Errors specific to price breakdown derivation.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A pricing parameter's currency differs from the sale currency.
    #[error("parameter priced in {0}, but sale is in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from component totalling.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// A discount applied to the whole sale.
#[derive(Clone, Debug, PartialEq)]
pub enum Discount<'a> {
    /// Reduce the subtotal by a fraction of itself (`0.10` is 10% off).
    Percentage(Percentage),

    /// Reduce the subtotal by a fixed amount.
    Fixed(Money<'a, Currency>),
}

/// Caller-supplied pricing configuration for one sale.
#[derive(Clone, Debug)]
pub struct PricingParameters<'a> {
    discount: Option<Discount<'a>>,
    tax_rate: Percentage,
}

impl<'a> PricingParameters<'a> {
    /// Create parameters with the given discount and tax rate.
    ///
    /// The tax rate is a fraction: `0.10` applies 10% tax to the discounted
    /// subtotal.
    #[must_use]
    pub fn new(discount: Option<Discount<'a>>, tax_rate: Percentage) -> Self {
        Self { discount, tax_rate }
    }

    /// No discount, zero tax.
    #[must_use]
    pub fn none() -> Self {
        Self {
            discount: None,
            tax_rate: Percentage::from(0.0),
        }
    }

    /// Returns the discount, if any.
    pub fn discount(&self) -> Option<&Discount<'a>> {
        self.discount.as_ref()
    }

    /// Returns the tax rate.
    #[must_use]
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }
}

impl Default for PricingParameters<'_> {
    fn default() -> Self {
        Self::none()
    }
}

/// Derived subtotal/discount/tax/total for a sale.
///
/// A value object: recomputed on demand from the components and parameters,
/// never mutated in place. Satisfies `total = subtotal - discount + tax`
/// exactly in minor units.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceBreakdown<'a> {
    subtotal: Money<'a, Currency>,
    discount_amount: Money<'a, Currency>,
    tax_amount: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> PriceBreakdown<'a> {
    /// Sum of all line totals before any adjustment.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount removed from the subtotal, clamped to the subtotal.
    #[must_use]
    pub fn discount_amount(&self) -> Money<'a, Currency> {
        self.discount_amount
    }

    /// Tax applied to the discounted subtotal.
    #[must_use]
    pub fn tax_amount(&self) -> Money<'a, Currency> {
        self.tax_amount
    }

    /// The amount due.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }
}

/// Derives the price breakdown for a set of components.
///
/// Pure and synchronous; callers recompute after every cart or parameter
/// mutation. An empty component list prices to zero in the given currency.
///
/// The discount is clamped to the subtotal, so a fixed discount larger than
/// the sale can never produce a negative total.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a component or fixed discount is in
///   a different currency than `currency`.
/// - [`PricingError::PercentConversion`]: a percentage computation could not
///   be represented.
/// - [`PricingError::TotalPrice`]: a line total could not be computed.
pub fn price<'a>(
    components: &[PricedComponent<'a>],
    parameters: &PricingParameters<'a>,
    currency: &'static Currency,
) -> Result<PriceBreakdown<'a>, PricingError> {
    let subtotal = if components.is_empty() {
        Money::from_minor(0, currency)
    } else {
        let total = total_price(components)?;

        if total.currency() != currency {
            return Err(PricingError::CurrencyMismatch(
                total.currency().iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        total
    };

    let subtotal_minor = subtotal.to_minor_units();

    let raw_discount_minor = match parameters.discount() {
        None => 0,
        Some(Discount::Percentage(rate)) => percent_of_minor(*rate, subtotal_minor)?,
        Some(Discount::Fixed(amount)) => {
            if amount.currency() != currency {
                return Err(PricingError::CurrencyMismatch(
                    amount.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            amount.to_minor_units()
        }
    };

    // A discount can never remove more than the sale is worth.
    let discount_minor = raw_discount_minor.clamp(0, subtotal_minor);

    let taxable_minor = subtotal_minor - discount_minor;
    let tax_minor = percent_of_minor(parameters.tax_rate(), taxable_minor)?;
    let total_minor = taxable_minor + tax_minor;

    Ok(PriceBreakdown {
        subtotal,
        discount_amount: Money::from_minor(discount_minor, currency),
        tax_amount: Money::from_minor(tax_minor, currency),
        total: Money::from_minor(total_minor, currency),
    })
}

/// Apply a fractional rate to a minor-unit amount, rounding half away from zero.
fn percent_of_minor(rate: Percentage, minor: i64) -> Result<i64, PricingError> {
    let applied = rate * Decimal::from(minor);
    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    rounded.to_i64().ok_or(PricingError::PercentConversion)
}
