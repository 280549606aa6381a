//! Order submission gateway

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::order::{OrderPayload, OrderStatus};

/// Errors from order submission. The caller keeps the draft on every
/// variant, so the operator can retry without re-entering the sale.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// HTTP transport failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The order store rejected the payload.
    #[error("order submission failed with status {status}: {body}")]
    Rejected {
        /// HTTP status returned by the store.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },
}

/// Acknowledgement returned by the order store.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedOrder {
    /// Durable identifier assigned by the store.
    pub id: Uuid,

    /// Human-facing order number.
    pub order_number: String,

    /// Status echoed back by the store.
    pub status: OrderStatus,
}

/// Durable order store, the only place orders outlive the session.
#[automock]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Persist the payload, returning the store's acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmissionError`] on transport failure or a non-success
    /// response.
    async fn create_order(&self, order: &OrderPayload) -> Result<SubmittedOrder, SubmissionError>;
}

/// Gateway submitting orders to a REST order store.
#[derive(Debug, Clone)]
pub struct RestOrderGateway {
    base_url: String,
    http: Client,
}

impl RestOrderGateway {
    /// Create a gateway for the given order store base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl OrderGateway for RestOrderGateway {
    async fn create_order(&self, order: &OrderPayload) -> Result<SubmittedOrder, SubmissionError> {
        let url = format!("{}/orders", self.base_url);

        let response = self.http.post(&url).json(order).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();

            return Err(SubmissionError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn submitted_order_parses_store_acknowledgement() -> TestResult {
        let json = r#"{
            "id": "0198a9ab-1111-7aaa-8aaa-000000000001",
            "orderNumber": "ORD-2031",
            "status": "confirmed"
        }"#;

        let submitted: SubmittedOrder = serde_json::from_str(json)?;

        assert_eq!(submitted.order_number, "ORD-2031");
        assert_eq!(submitted.status, OrderStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn mock_gateway_returns_configured_acknowledgement() -> TestResult {
        let mut gateway = MockOrderGateway::new();

        gateway.expect_create_order().returning(|order| {
            Ok(SubmittedOrder {
                id: Uuid::now_v7(),
                order_number: "ORD-1".to_string(),
                status: order.status,
            })
        });

        let payload = crate::order::test_support::draft_payload();
        let submitted = gateway.create_order(&payload).await?;

        assert_eq!(submitted.status, payload.status);

        Ok(())
    }
}
