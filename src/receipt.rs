//! Sale receipt

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    items::{PricedComponent, TotalPriceError},
    pricing::PriceBreakdown,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapped component totalling error.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Writes the line table and totals summary for a priced sale.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a line total cannot be computed or the
/// output cannot be written.
pub fn write_receipt(
    mut out: impl io::Write,
    components: &[PricedComponent<'_>],
    breakdown: &PriceBreakdown<'_>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit", "Line Total"]);

    for component in components {
        builder.push_record([
            component.label().to_string(),
            component.quantity().to_string(),
            format!("{}", component.unit_price()),
            format!("{}", component.line_total()?),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| ReceiptError::IO)?;

    write_summary(&mut out, breakdown)
}

fn write_summary(
    out: &mut impl io::Write,
    breakdown: &PriceBreakdown<'_>,
) -> Result<(), ReceiptError> {
    let rows = [
        ("Subtotal:", format!("{}", breakdown.subtotal())),
        ("Discount:", format!("-{}", breakdown.discount_amount())),
        ("Tax:", format!("{}", breakdown.tax_amount())),
        ("Total:", format!("{}", breakdown.total())),
    ];

    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, " {label:>9} {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
    }

    Ok(())
}
