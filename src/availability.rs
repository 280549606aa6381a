//! Inventory availability

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::order::OrderPayload;

/// Errors from the availability check itself, as opposed to a negative
/// verdict. Every variant is retryable from the caller's point of view.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// HTTP transport failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The inventory service answered with something other than a verdict.
    #[error("unexpected inventory response: {0}")]
    UnexpectedResponse(String),
}

/// Verdict from the inventory service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Availability {
    /// Every promised unit is on hand.
    Available,

    /// At least one line cannot be covered from stock.
    Unavailable,
}

/// Gating stock check invoked before an order may be confirmed.
///
/// The contract is "returns eventually": implementations may take their
/// time, and the caller applies its own deadline and retry policy. Draft
/// saves are not gated; only confirmation is.
#[automock]
#[async_trait]
pub trait AvailabilityChecker: Send + Sync {
    /// Ask whether the order's lines can be covered from current stock.
    ///
    /// # Errors
    ///
    /// Returns an [`AvailabilityError`] if the check itself could not be
    /// carried out. A definite "no" is [`Availability::Unavailable`], not an
    /// error.
    async fn check(&self, order: &OrderPayload) -> Result<Availability, AvailabilityError>;
}

/// Availability checker backed by an inventory HTTP service.
#[derive(Debug, Clone)]
pub struct RestAvailabilityChecker {
    base_url: String,
    http: Client,
}

impl RestAvailabilityChecker {
    /// Create a checker for the given inventory service base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl AvailabilityChecker for RestAvailabilityChecker {
    async fn check(&self, order: &OrderPayload) -> Result<Availability, AvailabilityError> {
        let url = format!("{}/inventory/check", self.base_url);

        let response = self.http.post(&url).json(order).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(AvailabilityError::UnexpectedResponse(format!(
                "inventory check failed with status {status}: {text}"
            )));
        }

        let parsed: AvailabilityResponse = response.json().await?;

        if parsed.available {
            Ok(Availability::Available)
        } else {
            Ok(Availability::Unavailable)
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityResponse {
    available: bool,
}
