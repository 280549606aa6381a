//! Till prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    availability::{Availability, AvailabilityChecker, AvailabilityError, RestAvailabilityChecker},
    cart::{CartError, CartLine, CartSession},
    catalog::{Catalog, Product, ProductKey},
    checkout::{Checkout, CheckoutError},
    fixtures::{CatalogFixture, FixtureError},
    gateway::{OrderGateway, RestOrderGateway, SubmissionError, SubmittedOrder},
    items::{PricedComponent, TotalPriceError, total_price},
    order::{
        Order, OrderContext, OrderError, OrderLine, OrderPayload, OrderStatus, PaymentMethod,
        PaymentStatus, Priority,
    },
    prescription::{
        LensMaterial, LensPriceTable, LensType, PrescriptionContext, PrescriptionError,
        parse_coatings,
    },
    pricing::{Discount, PriceBreakdown, PricingError, PricingParameters, price},
    receipt::{ReceiptError, write_receipt},
};
