//! Remote order submission.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use storefront::{
    cart::Cart,
    orders::{Order, OrderConfirmation, PaymentMethod},
    submission::{OrderSubmitter, SubmissionError},
};
use tracing::{info, warn};

use super::ApiClient;

const FALLBACK_REJECTION: &str = "Order failed";

/// Order body accepted by `POST /orders`.
#[derive(Debug, Serialize)]
pub struct OrderPayload<'a> {
    items: &'a Cart,
    #[serde(with = "rust_decimal::serde::float")]
    subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
    payment_method: PaymentMethod,
    delivery_first_name: &'a str,
    delivery_last_name: &'a str,
    delivery_email: &'a str,
    delivery_phone: &'a str,
    delivery_address: &'a str,
    delivery_city: &'a str,
    delivery_state: &'a str,
    delivery_zip: &'a str,
    delivery_country: &'a str,
}

impl<'a> From<&'a Order> for OrderPayload<'a> {
    fn from(order: &'a Order) -> Self {
        let delivery = order.delivery();

        Self {
            items: order.items(),
            subtotal: order.subtotal(),
            delivery_fee: order.delivery_fee(),
            total: order.total(),
            payment_method: order.payment_method(),
            delivery_first_name: &delivery.first_name,
            delivery_last_name: &delivery.last_name,
            delivery_email: &delivery.email,
            delivery_phone: &delivery.phone,
            delivery_address: &delivery.address,
            delivery_city: &delivery.city,
            delivery_state: &delivery.state,
            delivery_zip: &delivery.zip,
            delivery_country: &delivery.country,
        }
    }
}

/// Submitter that posts orders to the storefront API with the bearer token.
#[derive(Debug, Clone)]
pub struct HttpOrderSubmitter {
    client: ApiClient,
}

impl HttpOrderSubmitter {
    /// Create a submitter over an API client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderSubmitter for HttpOrderSubmitter {
    async fn submit(&self, order: &Order) -> Result<OrderConfirmation, SubmissionError> {
        let Some(token) = self.client.token() else {
            return Err(SubmissionError::Unauthenticated);
        };

        let response = self
            .client
            .http()
            .post(self.client.url("orders"))
            .header("Accept", "application/json")
            .bearer_auth(token)
            .json(&OrderPayload::from(order))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;
        let body = serde_json::from_str::<Value>(&text).ok();

        if !status.is_success() {
            let message = body
                .as_ref()
                .and_then(|body| body.get("message"))
                .and_then(Value::as_str)
                .unwrap_or(FALLBACK_REJECTION)
                .to_string();

            warn!(order = %order.id(), status = status.as_u16(), "order rejected: {message}");

            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reference = body
            .as_ref()
            .and_then(created_reference)
            .unwrap_or_else(|| order.id().to_string());

        info!(order = %order.id(), reference = %reference, "order submitted");

        Ok(OrderConfirmation {
            reference,
            response: body,
        })
    }
}

/// Identifier of the created order resource, from `id` or `data.id`.
fn created_reference(body: &Value) -> Option<String> {
    let id = body
        .get("id")
        .or_else(|| body.get("data").and_then(|data| data.get("id")))?;

    match id {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn transport(error: reqwest::Error) -> SubmissionError {
    SubmissionError::Transport(Box::new(error))
}
