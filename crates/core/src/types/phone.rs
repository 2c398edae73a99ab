//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`] number.
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, separators, or a
    /// leading +.
    #[error("phone number contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// The digit count is outside the accepted range.
    #[error("phone number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number, stored in normalized form.
///
/// Parsing strips spaces, dashes, dots, and parentheses, keeping an optional
/// leading `+`. The backend stores numbers as entered by students, so this
/// type is deliberately lenient: it checks shape, not carrier validity.
///
/// ## Examples
///
/// ```
/// use nivasity_core::Phone;
///
/// let phone = Phone::parse("+234 803 123-4567").unwrap();
/// assert_eq!(phone.as_str(), "+2348031234567");
///
/// assert!(Phone::parse("0803 123 4567").is_ok());
/// assert!(Phone::parse("call me").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits (short national formats).
    pub const MIN_DIGITS: usize = 7;
    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `Phone` from a string, stripping common separators.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains characters other
    /// than digits and separators, or has fewer than 7 or more than 15
    /// digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }

        let mut normalized = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.chars().enumerate() {
            match c {
                '+' if i == 0 => normalized.push('+'),
                '0'..='9' => normalized.push(c),
                ' ' | '-' | '.' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        let digits = normalized.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(normalized))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
