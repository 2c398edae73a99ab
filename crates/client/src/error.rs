//! Unified error type for the API client.

use thiserror::Error;

use crate::store::StoreError;

/// Fallback message when the backend sends no usable error body.
pub(crate) const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when talking to the Nivasity backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (DNS, TLS, timeout, connection reset).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend reported a business error.
    ///
    /// `message` is the human-readable text extracted from the response
    /// envelope when available, so screens can show it directly.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code of the failed response.
        status: u16,
        /// Human-readable message from the backend.
        message: String,
    },

    /// The response body was not valid JSON.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The response parsed but did not match any known payload shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The session is unusable: refresh failed, no refresh token was
    /// stored, or the backend kept rejecting the refreshed credentials.
    /// The local session has been cleared; the user must sign in again.
    #[error("Session expired - sign in again")]
    SessionExpired,

    /// Reading or writing the device key-value store failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Whether this error means the user must re-authenticate.
    #[must_use]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 422,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 422 - Email already registered");
    }

    #[test]
    fn test_session_expired_display() {
        assert_eq!(
            ApiError::SessionExpired.to_string(),
            "Session expired - sign in again"
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = ApiError::Malformed("missing data in success response".to_string());
        assert_eq!(
            err.to_string(),
            "Malformed response: missing data in success response"
        );
    }

    #[test]
    fn test_is_auth_error() {
        assert!(ApiError::SessionExpired.is_auth_error());
        assert!(
            !ApiError::Api {
                status: 500,
                message: String::new()
            }
            .is_auth_error()
        );
    }
}
