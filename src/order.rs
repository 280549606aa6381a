//! Orders

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    items::{PricedComponent, TotalPriceError},
    pricing::PriceBreakdown,
};

/// Errors related to order assembly and lifecycle.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// Assembly was attempted with nothing to sell.
    #[error("order has no line items and no prescription")]
    EmptyOrder,

    /// The requested status change is not allowed from the current status.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Status the order is currently in.
        from: OrderStatus,
        /// Status the caller asked for.
        to: OrderStatus,
    },

    /// Wrapped component totalling error.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// Order lifecycle status.
///
/// A draft moves to confirmed only after a passing availability check, or to
/// cancelled at any time. Confirmed and cancelled orders are terminal in
/// this engine; anything past that belongs to the order store.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Assembled and priced, not yet committed.
    Draft,

    /// Committed against checked stock.
    Confirmed,

    /// Abandoned before confirmation.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
        };

        f.write_str(name)
    }
}

/// Payment method selected at the till.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,

    /// Card payment.
    Card,
}

/// Payment settlement state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Payment not yet taken.
    Pending,

    /// Payment settled.
    Paid,
}

/// Fulfilment priority.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Standard turnaround.
    Normal,

    /// Expedited turnaround.
    Urgent,
}

/// Contextual identifiers and options carried on an order.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderContext {
    /// Customer the order is for.
    pub customer: Uuid,

    /// Store the sale happened in.
    pub store: Uuid,

    /// Prescription backing a specs order, if any.
    pub prescription: Option<Uuid>,

    /// Payment method selected at the till.
    pub payment_method: PaymentMethod,

    /// Payment settlement state.
    pub payment_status: PaymentStatus,

    /// Fulfilment priority.
    pub priority: Priority,

    /// Free-text notes.
    pub notes: Option<String>,
}

impl OrderContext {
    /// Create a context for a customer and store with default options: cash,
    /// pending payment, normal priority, no prescription, no notes.
    #[must_use]
    pub fn new(customer: Uuid, store: Uuid) -> Self {
        Self {
            customer,
            store,
            prescription: None,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            priority: Priority::Normal,
            notes: None,
        }
    }
}

/// A line snapshot carried on an order, in minor units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Display label of the line.
    pub label: String,

    /// Unit price in minor units.
    pub unit_price: i64,

    /// Quantity.
    pub quantity: u32,

    /// Line total in minor units.
    pub line_total: i64,
}

/// An assembled, priced order.
///
/// Assembly snapshots the price breakdown and line components as they stand;
/// nothing is recomputed afterwards, so the figures submitted to the store
/// are exactly the figures shown to the operator.
#[derive(Clone, Debug)]
pub struct Order<'a> {
    uuid: Uuid,
    status: OrderStatus,
    context: OrderContext,
    lines: Vec<OrderLine>,
    breakdown: PriceBreakdown<'a>,
    assembled_at: Timestamp,
}

impl<'a> Order<'a> {
    /// Assemble a draft order from priced components and their breakdown.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyOrder`]: no components and no prescription
    ///   reference.
    /// - [`OrderError::TotalPrice`]: a line total could not be computed.
    pub fn assemble(
        components: &[PricedComponent<'a>],
        breakdown: PriceBreakdown<'a>,
        context: OrderContext,
    ) -> Result<Self, OrderError> {
        if components.is_empty() && context.prescription.is_none() {
            return Err(OrderError::EmptyOrder);
        }

        let lines = components
            .iter()
            .map(|component| {
                Ok(OrderLine {
                    label: component.label().to_string(),
                    unit_price: component.unit_price().to_minor_units(),
                    quantity: component.quantity(),
                    line_total: component.line_total()?.to_minor_units(),
                })
            })
            .collect::<Result<Vec<_>, OrderError>>()?;

        Ok(Self {
            uuid: Uuid::now_v7(),
            status: OrderStatus::Draft,
            context,
            lines,
            breakdown,
            assembled_at: Timestamp::now(),
        })
    }

    /// Returns the order identifier.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the order context.
    #[must_use]
    pub fn context(&self) -> &OrderContext {
        &self.context
    }

    /// Returns the line snapshots.
    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Returns the price breakdown snapshotted at assembly.
    pub fn breakdown(&self) -> &PriceBreakdown<'a> {
        &self.breakdown
    }

    /// Returns the assembly timestamp.
    #[must_use]
    pub fn assembled_at(&self) -> Timestamp {
        self.assembled_at
    }

    /// Move the order to confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is a draft.
    pub fn mark_confirmed(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Confirmed)
    }

    /// Move the order to cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] unless the order is a draft.
    pub fn mark_cancelled(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        match (self.status, to) {
            (OrderStatus::Draft, OrderStatus::Confirmed | OrderStatus::Cancelled) => {
                self.status = to;

                Ok(())
            }
            (from, to) => Err(OrderError::InvalidTransition { from, to }),
        }
    }

    /// Lower the order to its owned wire payload.
    #[must_use]
    pub fn payload(&self) -> OrderPayload {
        OrderPayload {
            order_uuid: self.uuid,
            status: self.status,
            customer_uuid: self.context.customer,
            store_uuid: self.context.store,
            prescription_uuid: self.context.prescription,
            line_items: self.lines.clone(),
            subtotal: self.breakdown.subtotal().to_minor_units(),
            discount_amount: self.breakdown.discount_amount().to_minor_units(),
            tax_amount: self.breakdown.tax_amount().to_minor_units(),
            total: self.breakdown.total().to_minor_units(),
            currency: self.breakdown.total().currency().iso_alpha_code.to_string(),
            payment_method: self.context.payment_method,
            payment_status: self.context.payment_status,
            priority: self.context.priority,
            notes: self.context.notes.clone(),
            assembled_at: self.assembled_at,
        }
    }
}

/// JSON payload handed to the order store.
///
/// Monetary fields are minor units in `currency`. Field names follow the
/// store's camelCase convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Client-side order identifier.
    pub order_uuid: Uuid,

    /// Lifecycle status being requested.
    pub status: OrderStatus,

    /// Customer the order is for.
    pub customer_uuid: Uuid,

    /// Store the sale happened in.
    pub store_uuid: Uuid,

    /// Prescription backing a specs order, if any.
    pub prescription_uuid: Option<Uuid>,

    /// Line snapshots.
    pub line_items: Vec<OrderLine>,

    /// Subtotal in minor units.
    pub subtotal: i64,

    /// Discount amount in minor units.
    pub discount_amount: i64,

    /// Tax amount in minor units.
    pub tax_amount: i64,

    /// Amount due in minor units.
    pub total: i64,

    /// ISO alpha currency code for all monetary fields.
    pub currency: String,

    /// Payment method selected at the till.
    pub payment_method: PaymentMethod,

    /// Payment settlement state.
    pub payment_status: PaymentStatus,

    /// Fulfilment priority.
    pub priority: Priority,

    /// Free-text notes.
    pub notes: Option<String>,

    /// When the order was assembled.
    pub assembled_at: Timestamp,
}
