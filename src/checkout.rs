//! Checkout orchestration

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use thiserror::Error;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::{
    availability::{Availability, AvailabilityChecker, AvailabilityError},
    gateway::{OrderGateway, SubmissionError, SubmittedOrder},
    order::{Order, OrderError, OrderStatus},
};

/// Default deadline for the availability check.
const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors surfaced by the checkout orchestration.
///
/// None of these are fatal to the session: the order stays in draft and the
/// operator decides whether to retry, amend or cancel.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order is not in a state that permits the operation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A confirmation through this checkout is already in flight.
    #[error("a confirmation is already in flight")]
    ConfirmInFlight,

    /// The availability check itself failed; retryable.
    #[error(transparent)]
    Check(#[from] AvailabilityError),

    /// The availability check did not answer within the deadline; retryable.
    #[error("availability check timed out after {0:?}")]
    CheckTimeout(Duration),

    /// The inventory service reported the promised stock is not on hand.
    #[error("stock is not available for this order")]
    StockUnavailable,

    /// The order store rejected or failed the submission; the draft is
    /// preserved.
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Orchestrates draft persistence and availability-gated confirmation.
///
/// One checkout serves one till: confirmation is single-flight, and order
/// mutation only ever happens through the `&mut Order` the caller passes in,
/// so a result arriving after the caller has abandoned the sale has nothing
/// left to mutate.
pub struct Checkout {
    checker: Arc<dyn AvailabilityChecker>,
    gateway: Arc<dyn OrderGateway>,
    check_timeout: Duration,
    confirm_in_flight: AtomicBool,
}

impl fmt::Debug for Checkout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checkout")
            .field("check_timeout", &self.check_timeout)
            .field(
                "confirm_in_flight",
                &self.confirm_in_flight.load(Ordering::Relaxed),
            )
            .finish_non_exhaustive()
    }
}

impl Checkout {
    /// Create a checkout over the given collaborators with the default
    /// availability deadline.
    #[must_use]
    pub fn new(checker: Arc<dyn AvailabilityChecker>, gateway: Arc<dyn OrderGateway>) -> Self {
        Self {
            checker,
            gateway,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            confirm_in_flight: AtomicBool::new(false),
        }
    }

    /// Override the availability check deadline.
    #[must_use]
    pub fn with_check_timeout(mut self, check_timeout: Duration) -> Self {
        self.check_timeout = check_timeout;

        self
    }

    /// Persist the order as a draft. No availability gate applies: drafts may
    /// be created speculatively.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Order`]: the order is not a draft.
    /// - [`CheckoutError::Submission`]: the store rejected or failed the
    ///   submission; the draft is preserved for retry.
    #[instrument(skip_all, fields(order = %order.uuid()))]
    pub async fn save_draft(&self, order: &Order<'_>) -> Result<SubmittedOrder, CheckoutError> {
        if order.status() != OrderStatus::Draft {
            return Err(OrderError::InvalidTransition {
                from: order.status(),
                to: OrderStatus::Draft,
            }
            .into());
        }

        let submitted = self.gateway.create_order(&order.payload()).await?;

        info!(order_number = %submitted.order_number, "draft saved");

        Ok(submitted)
    }

    /// Confirm the order: availability gate first, then submission.
    ///
    /// The draft survives every failure path; only a successful submission
    /// moves the order to confirmed. A second confirmation through this
    /// checkout while one is in flight is rejected rather than queued, so a
    /// double-press can never create two orders.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Order`]: the order is not a draft.
    /// - [`CheckoutError::ConfirmInFlight`]: another confirmation is running.
    /// - [`CheckoutError::Check`] / [`CheckoutError::CheckTimeout`]: the
    ///   availability check failed or missed its deadline; retryable.
    /// - [`CheckoutError::StockUnavailable`]: the inventory service said no.
    /// - [`CheckoutError::Submission`]: the store rejected or failed the
    ///   submission.
    #[instrument(skip_all, fields(order = %order.uuid()))]
    pub async fn confirm(&self, order: &mut Order<'_>) -> Result<SubmittedOrder, CheckoutError> {
        if order.status() != OrderStatus::Draft {
            return Err(OrderError::InvalidTransition {
                from: order.status(),
                to: OrderStatus::Confirmed,
            }
            .into());
        }

        let _guard = InFlightGuard::acquire(&self.confirm_in_flight)
            .ok_or(CheckoutError::ConfirmInFlight)?;

        let mut payload = order.payload();

        let verdict = match timeout(self.check_timeout, self.checker.check(&payload)).await {
            Err(_elapsed) => {
                warn!(deadline = ?self.check_timeout, "availability check timed out");

                return Err(CheckoutError::CheckTimeout(self.check_timeout));
            }
            Ok(Err(error)) => {
                warn!(%error, "availability check failed");

                return Err(error.into());
            }
            Ok(Ok(verdict)) => verdict,
        };

        if verdict == Availability::Unavailable {
            warn!("stock unavailable; order stays in draft");

            return Err(CheckoutError::StockUnavailable);
        }

        payload.status = OrderStatus::Confirmed;

        let submitted = self.gateway.create_order(&payload).await?;

        order.mark_confirmed()?;

        info!(order_number = %submitted.order_number, "order confirmed");

        Ok(submitted)
    }

    /// Cancel a draft locally. Cancelled orders are terminal in this engine;
    /// nothing is sent to the store.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Order`] unless the order is a draft.
    pub fn cancel(&self, order: &mut Order<'_>) -> Result<(), CheckoutError> {
        order.mark_cancelled()?;

        info!(order = %order.uuid(), "order cancelled");

        Ok(())
    }
}

/// Releases the confirm flag when the confirmation attempt ends, on every
/// exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
