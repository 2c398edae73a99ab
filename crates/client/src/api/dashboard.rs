//! Dashboard endpoints: order history, support tickets, server cart.

use serde::Deserialize;
use tracing::instrument;

use nivasity_core::{OrderId, TicketId};

use crate::client::{ApiRequest, NivasityClient};
use crate::error::ApiError;
use crate::models::cart::CartLine;
use crate::models::order::RawOrder;
use crate::models::ticket::{RawTicket, RawTicketMessage};
use crate::models::{Cart, Order, Ticket, TicketMessage};

/// Server-side cart line. The backend keeps a reconciled copy of the cart
/// so a student can resume on another device.
#[derive(Debug, Deserialize)]
struct RawCartLine {
    material_id: i64,
    #[serde(alias = "name")]
    title: String,
    #[serde(alias = "price")]
    unit_price: rust_decimal::Decimal,
    #[serde(default)]
    currency: Option<nivasity_core::CurrencyCode>,
    #[serde(default = "one", alias = "qty")]
    quantity: u32,
}

const fn one() -> u32 {
    1
}

impl RawCartLine {
    fn normalize(self) -> Result<CartLine, ApiError> {
        let currency = self.currency.unwrap_or_default();
        let unit_price = nivasity_core::Price::new(self.unit_price, currency)
            .map_err(|e| ApiError::Malformed(format!("cart line {}: {e}", self.material_id)))?;
        Ok(CartLine {
            material_id: nivasity_core::MaterialId::new(self.material_id),
            title: self.title,
            unit_price,
            quantity: self.quantity,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawServerCart {
    #[serde(default, alias = "lines")]
    items: Vec<RawCartLine>,
}

impl NivasityClient {
    // =========================================================================
    // Orders
    // =========================================================================

    /// The student's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, auth, or payload failures.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        let raw: Vec<RawOrder> = self.execute(ApiRequest::get("/dashboard/orders")).await?;
        raw.into_iter().map(RawOrder::normalize).collect()
    }

    /// One order with its line items.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the order
    /// does not exist or belongs to another account.
    #[instrument(skip(self))]
    pub async fn order(&self, id: OrderId) -> Result<Order, ApiError> {
        let raw: RawOrder = self
            .execute(ApiRequest::get(format!("/dashboard/orders/{id}")))
            .await?;
        raw.normalize()
    }

    // =========================================================================
    // Support tickets
    // =========================================================================

    /// The student's support tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, auth, or payload failures.
    #[instrument(skip(self))]
    pub async fn tickets(&self) -> Result<Vec<Ticket>, ApiError> {
        let raw: Vec<RawTicket> = self.execute(ApiRequest::get("/dashboard/tickets")).await?;
        Ok(raw.into_iter().map(RawTicket::normalize).collect())
    }

    /// Open a new support ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the
    /// subject or message fails validation.
    #[instrument(skip(self, message), fields(subject = %subject))]
    pub async fn open_ticket(&self, subject: &str, message: &str) -> Result<Ticket, ApiError> {
        let raw: RawTicket = self
            .execute(ApiRequest::post(
                "/dashboard/tickets",
                serde_json::json!({ "subject": subject, "message": message }),
            ))
            .await?;
        Ok(raw.normalize())
    }

    /// The messages of one ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the
    /// ticket does not exist.
    #[instrument(skip(self))]
    pub async fn ticket_messages(&self, id: TicketId) -> Result<Vec<TicketMessage>, ApiError> {
        let raw: Vec<RawTicketMessage> = self
            .execute(ApiRequest::get(format!("/dashboard/tickets/{id}/messages")))
            .await?;
        raw.into_iter().map(|message| message.normalize(id)).collect()
    }

    /// Add a reply to a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Api`] with the backend's message when the
    /// ticket is closed.
    #[instrument(skip(self, message))]
    pub async fn reply_ticket(
        &self,
        id: TicketId,
        message: &str,
    ) -> Result<TicketMessage, ApiError> {
        let raw: RawTicketMessage = self
            .execute(ApiRequest::post(
                format!("/dashboard/tickets/{id}/messages"),
                serde_json::json!({ "message": message }),
            ))
            .await?;
        raw.normalize(id)
    }

    // =========================================================================
    // Cart reconciliation
    // =========================================================================

    /// The server's copy of the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport, auth, or payload failures.
    #[instrument(skip(self))]
    pub async fn server_cart(&self) -> Result<Cart, ApiError> {
        let raw: RawServerCart = self.execute(ApiRequest::get("/dashboard/cart")).await?;
        let lines = raw
            .items
            .into_iter()
            .map(RawCartLine::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let mut cart = Cart::new();
        cart.replace_lines(lines);
        Ok(cart)
    }

    /// Push the local cart to the backend and adopt the reconciled result.
    ///
    /// Best-effort by design: any failure is logged and the local cart is
    /// returned unchanged, so the student never loses their selection to a
    /// dead network.
    #[instrument(skip(self, cart), fields(lines = cart.len()))]
    pub async fn sync_cart(&self, cart: &Cart) -> Cart {
        match self.push_cart(cart).await {
            Ok(reconciled) => reconciled,
            Err(err) => {
                tracing::warn!(error = %err, "cart sync failed; keeping local cart");
                cart.clone()
            }
        }
    }

    async fn push_cart(&self, cart: &Cart) -> Result<Cart, ApiError> {
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

        let raw: RawServerCart = self
            .execute(ApiRequest::put(
                "/dashboard/cart",
                serde_json::json!({ "items": items }),
            ))
            .await?;

        let lines = raw
            .items
            .into_iter()
            .map(RawCartLine::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let mut reconciled = Cart::new();
        reconciled.replace_lines(lines);
        Ok(reconciled)
    }
}
