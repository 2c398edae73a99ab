//! Order history records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use nivasity_core::{
    CurrencyCode, MaterialId, OrderId, OrderItemId, OrderStatus, PaymentStatus, Price,
};

use crate::error::ApiError;

/// A completed or in-flight purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Gateway payment reference for this order.
    pub reference: String,
    /// Order lifecycle status.
    pub status: OrderStatus,
    /// Payment status reported by the gateway.
    pub payment_status: PaymentStatus,
    /// Order total.
    pub total: Price,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Purchased materials. Empty in list views; populated in detail views.
    pub items: Vec<OrderItem>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    /// Unique order line ID.
    pub id: OrderItemId,
    /// Material purchased.
    pub material_id: MaterialId,
    /// Title snapshot at purchase time.
    pub title: String,
    /// Unit price at purchase time.
    pub unit_price: Price,
    /// Copies purchased.
    pub quantity: u32,
}

/// Raw order payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawOrder {
    #[serde(alias = "order_id")]
    id: i64,
    #[serde(alias = "payment_reference", alias = "ref")]
    reference: String,
    status: String,
    #[serde(default)]
    payment_status: PaymentStatus,
    #[serde(alias = "amount", alias = "total_amount")]
    total: Decimal,
    #[serde(default)]
    currency: Option<CurrencyCode>,
    created_at: DateTime<Utc>,
    #[serde(default, alias = "order_items")]
    items: Vec<RawOrderItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOrderItem {
    #[serde(alias = "item_id")]
    id: i64,
    material_id: i64,
    #[serde(alias = "name")]
    title: String,
    #[serde(alias = "price")]
    unit_price: Decimal,
    #[serde(default = "default_quantity", alias = "qty")]
    quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

impl RawOrder {
    pub(crate) fn normalize(self) -> Result<Order, ApiError> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(|e| ApiError::Malformed(format!("order {}: {e}", self.id)))?;
        let currency = self.currency.unwrap_or_default();
        let total = Price::new(self.total, currency)
            .map_err(|e| ApiError::Malformed(format!("order {}: {e}", self.id)))?;
        let items = self
            .items
            .into_iter()
            .map(|item| item.normalize(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: OrderId::new(self.id),
            reference: self.reference,
            status,
            payment_status: self.payment_status,
            total,
            created_at: self.created_at,
            items,
        })
    }
}

impl RawOrderItem {
    fn normalize(self, currency: CurrencyCode) -> Result<OrderItem, ApiError> {
        let unit_price = Price::new(self.unit_price, currency)
            .map_err(|e| ApiError::Malformed(format!("order item {}: {e}", self.id)))?;
        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            material_id: MaterialId::new(self.material_id),
            title: self.title,
            unit_price,
            quantity: self.quantity,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_order_detail() {
        let raw: RawOrder = serde_json::from_str(
            r#"{
                "id": 301,
                "reference": "NIV-2026-000301",
                "status": "completed",
                "payment_status": "paid",
                "total": "2000.00",
                "currency": "NGN",
                "created_at": "2026-03-14T09:30:00Z",
                "items": [
                    {"id": 1, "material_id": 5, "title": "CSC 201 Lecture Notes", "price": "1500.00", "qty": 1},
                    {"id": 2, "material_id": 9, "title": "GST 101 Past Questions", "price": "500.00"}
                ]
            }"#,
        )
        .unwrap();
        let order = raw.normalize().unwrap();

        assert_eq!(order.id, OrderId::new(301));
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.total.amount(), Decimal::new(200_000, 2));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[1].quantity, 1);
    }

    #[test]
    fn test_normalize_order_list_variant() {
        // List views use the older keys and omit items
        let raw: RawOrder = serde_json::from_str(
            r#"{
                "order_id": 301,
                "payment_reference": "NIV-2026-000301",
                "status": "pending",
                "total_amount": 2000,
                "created_at": "2026-03-14T09:30:00+01:00"
            }"#,
        )
        .unwrap();
        let order = raw.normalize().unwrap();

        assert_eq!(order.reference, "NIV-2026-000301");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_normalize_rejects_unknown_status() {
        let raw: RawOrder = serde_json::from_str(
            r#"{"id": 1, "reference": "X", "status": "shipped", "total": 1, "created_at": "2026-03-14T09:30:00Z"}"#,
        )
        .unwrap();
        assert!(matches!(raw.normalize(), Err(ApiError::Malformed(_))));
    }
}
