//! Backend response envelope.
//!
//! Every REST endpoint wraps its payload as `{status, message, data?}` with
//! `status` being `"success"` or `"error"`. This module maps that envelope
//! into `Result` values and extracts human-readable messages from error
//! bodies.

use serde::Deserialize;

use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};

/// Envelope status discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EnvelopeStatus {
    Success,
    Error,
}

/// A deserialized response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload of a data-carrying endpoint.
    pub(crate) fn into_result(self, http_status: u16) -> Result<T, ApiError> {
        match self.status {
            EnvelopeStatus::Success => self.data.ok_or_else(|| {
                ApiError::Malformed("missing data in success response".to_string())
            }),
            EnvelopeStatus::Error => Err(ApiError::Api {
                status: http_status,
                message: self
                    .message
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            }),
        }
    }

    /// Unwrap a message-only endpoint (no payload expected).
    pub(crate) fn into_ack(self, http_status: u16) -> Result<String, ApiError> {
        match self.status {
            EnvelopeStatus::Success => Ok(self.message.unwrap_or_else(|| "OK".to_string())),
            EnvelopeStatus::Error => Err(ApiError::Api {
                status: http_status,
                message: self
                    .message
                    .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            }),
        }
    }
}

/// Loosely-shaped error body, for non-2xx responses that may or may not be
/// well-formed envelopes.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extract the most useful human-readable message from an error body,
/// falling back to a generic message.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}
