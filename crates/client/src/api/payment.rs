//! Payment gateway endpoints.
//!
//! Checkout is hosted: `initialize_payment` opens a gateway session and
//! returns the URL the app redirects the student to; on return,
//! `verify_payment` looks up what actually happened to the charge.

use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use nivasity_core::OrderId;

use crate::client::{ApiRequest, NivasityClient};
use crate::error::ApiError;
use crate::models::order::RawOrder;
use crate::models::{Cart, Order};

/// A hosted checkout session opened at the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// URL of the gateway's hosted payment page.
    #[serde(alias = "authorization_url")]
    pub checkout_url: String,
    /// Gateway reference used to look the payment up afterwards.
    pub reference: String,
    /// Order created for this checkout, when the backend reports it.
    #[serde(default)]
    pub order_id: Option<OrderId>,
}

impl NivasityClient {
    /// Open a hosted checkout session for the cart's contents.
    ///
    /// Sends an idempotency key so a flaky connection cannot open two
    /// gateway sessions for one tap of the pay button.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the cart
    /// is empty or a material is no longer available.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn initialize_payment(&self, cart: &Cart) -> Result<CheckoutSession, ApiError> {
        let items: Vec<serde_json::Value> = cart
            .lines()
            .iter()
            .map(|line| {
                serde_json::json!({
                    "material_id": line.material_id,
                    "quantity": line.quantity,
                })
            })
            .collect();

        self.execute(
            ApiRequest::post("/payment/initialize", serde_json::json!({ "items": items }))
                .idempotency_key(Uuid::new_v4().to_string()),
        )
        .await
    }

    /// Look up the order behind a gateway reference after the student
    /// returns from the hosted checkout page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the
    /// reference is unknown.
    #[instrument(skip(self), fields(reference = %reference))]
    pub async fn verify_payment(&self, reference: &str) -> Result<Order, ApiError> {
        let raw: RawOrder = self
            .execute(ApiRequest::get(format!(
                "/payment/verify/{}",
                urlencoding::encode(reference)
            )))
            .await?;
        raw.normalize()
    }
}
