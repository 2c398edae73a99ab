//! Status enums for orders, payments, and support tickets.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Created but not yet paid.
    #[default]
    Pending,
    /// Payment confirmed, fulfillment in progress.
    Processing,
    /// Delivered to the student's library.
    Completed,
    /// Cancelled before payment completed.
    Cancelled,
    /// Payment or fulfillment failed.
    Failed,
    /// Payment returned to the student.
    Refunded,
}

impl OrderStatus {
    /// Whether the order has reached a final state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Failed | Self::Refunded
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status for a checkout reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Checkout initialized, gateway not yet confirmed.
    #[default]
    Pending,
    /// Gateway confirmed the charge.
    Paid,
    /// Gateway declined or the session expired.
    Failed,
}

/// Support ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Waiting on support.
    #[default]
    Open,
    /// Support replied, waiting on the student.
    Answered,
    /// Resolved.
    Closed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let parsed: OrderStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(parsed, OrderStatus::Refunded);
    }

    #[test]
    fn test_order_status_from_str() {
        assert_eq!(
            OrderStatus::from_str("completed").unwrap(),
            OrderStatus::Completed
        );
        // American spelling shows up in older backend payloads
        assert_eq!(
            OrderStatus::from_str("canceled").unwrap(),
            OrderStatus::Cancelled
        );
        assert!(OrderStatus::from_str("shipped").is_err());
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
    }

    #[test]
    fn test_order_status_display_roundtrip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
            OrderStatus::Failed,
            OrderStatus::Refunded,
        ] {
            assert_eq!(OrderStatus::from_str(&status.to_string()).unwrap(), status);
        }
    }

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_ticket_status_serde() {
        let parsed: TicketStatus = serde_json::from_str("\"answered\"").unwrap();
        assert_eq!(parsed, TicketStatus::Answered);
    }
}
