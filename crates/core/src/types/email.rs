//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain exactly one @ symbol separating two
    /// non-empty parts.
    #[error("email must have the form local@domain")]
    Malformed,
}

/// An email address, normalized for account lookup.
///
/// Parsing trims surrounding whitespace and lowercases the address, so two
/// spellings of the same account email compare equal. Validation is
/// structural only (the backend owns deliverability checks).
///
/// ## Constraints
///
/// - Length: 1-254 characters after trimming (RFC 5321 limit)
/// - Exactly one @ symbol with non-empty local and domain parts
///
/// ## Examples
///
/// ```
/// use nivasity_core::Email;
///
/// let email = Email::parse("  Jumoke.Ade@Unilag.edu.NG ").unwrap();
/// assert_eq!(email.as_str(), "jumoke.ade@unilag.edu.ng");
/// assert_eq!(email.domain(), "unilag.edu.ng");
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string, trimming and lowercasing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 254
    /// characters, or not of the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }

        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let mut parts = trimmed.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("student@unilag.edu.ng").is_ok());
        assert!(Email::parse("first.last@futa.edu.ng").is_ok());
        assert!(Email::parse("user+tag@gmail.com").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let email = Email::parse(" Student@UNILAG.edu.NG ").unwrap();
        assert_eq!(email.as_str(), "student@unilag.edu.ng");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
        assert!(matches!(Email::parse("   "), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Email::parse("no-at-symbol"),
            Err(EmailError::Malformed)
        ));
        assert!(matches!(Email::parse("@domain.com"), Err(EmailError::Malformed)));
        assert!(matches!(Email::parse("user@"), Err(EmailError::Malformed)));
        assert!(matches!(Email::parse("a@b@c"), Err(EmailError::Malformed)));
    }

    #[test]
    fn test_parts() {
        let email = Email::parse("student@unilag.edu.ng").unwrap();
        assert_eq!(email.local_part(), "student");
        assert_eq!(email.domain(), "unilag.edu.ng");
    }

    #[test]
    fn test_serde_roundtrip() {
        let email = Email::parse("student@unilag.edu.ng").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"student@unilag.edu.ng\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn test_from_str() {
        let email: Email = "student@unilag.edu.ng".parse().unwrap();
        assert_eq!(email.as_str(), "student@unilag.edu.ng");
    }
}
