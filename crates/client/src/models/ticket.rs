//! Support ticket records.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use nivasity_core::{TicketId, TicketMessageId, TicketStatus};

use crate::error::ApiError;

/// A support conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Unique ticket ID.
    pub id: TicketId,
    /// Subject line.
    pub subject: String,
    /// Current status.
    pub status: TicketStatus,
    /// When the ticket was opened.
    pub created_at: DateTime<Utc>,
    /// When the ticket last changed, if the backend tracks it.
    pub updated_at: Option<DateTime<Utc>>,
}

/// One message within a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMessage {
    /// Unique message ID.
    pub id: TicketMessageId,
    /// Ticket this message belongs to.
    pub ticket_id: TicketId,
    /// Message text.
    pub body: String,
    /// True when sent by the support team, false when sent by the student.
    pub from_support: bool,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}

/// Raw ticket payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTicket {
    #[serde(alias = "ticket_id")]
    id: i64,
    #[serde(alias = "title")]
    subject: String,
    #[serde(default)]
    status: TicketStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl RawTicket {
    pub(crate) fn normalize(self) -> Ticket {
        Ticket {
            id: TicketId::new(self.id),
            subject: self.subject,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Raw ticket message payload.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTicketMessage {
    #[serde(alias = "message_id")]
    id: i64,
    ticket_id: i64,
    #[serde(alias = "message", alias = "text")]
    body: String,
    #[serde(default, alias = "is_admin", alias = "from_staff")]
    from_support: bool,
    created_at: DateTime<Utc>,
}

impl RawTicketMessage {
    pub(crate) fn normalize(self, ticket: TicketId) -> Result<TicketMessage, ApiError> {
        if self.ticket_id != ticket.as_i64() {
            return Err(ApiError::Malformed(format!(
                "message {} belongs to ticket {}, expected {ticket}",
                self.id, self.ticket_id
            )));
        }
        Ok(TicketMessage {
            id: TicketMessageId::new(self.id),
            ticket_id: ticket,
            body: self.body,
            from_support: self.from_support,
            created_at: self.created_at,
        })
    }
}
