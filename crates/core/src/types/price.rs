//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// Two prices in different currencies were combined.
    #[error("currency mismatch: {0:?} vs {1:?}")]
    CurrencyMismatch(CurrencyCode, CurrencyCode),
}

/// A non-negative price with currency information.
///
/// Amounts are in the currency's standard unit (naira, not kobo) and use
/// decimal arithmetic throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// A zero price in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency_code,
        }
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The ISO 4217 currency code.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Multiply by a quantity (for order line totals).
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency_code: self.currency_code,
        }
    }

    /// Add another price in the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(&self, other: &Self) -> Result<Self, PriceError> {
        if self.currency_code != other.currency_code {
            return Err(PriceError::CurrencyMismatch(
                self.currency_code,
                other.currency_code,
            ));
        }
        Ok(Self {
            amount: self.amount + other.amount,
            currency_code: self.currency_code,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes the storefront deals in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// Nigerian naira.
    #[default]
    Ngn,
    /// United States dollar.
    Usd,
}

impl CurrencyCode {
    /// The display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Ngn => "\u{20a6}",
            Self::Usd => "$",
        }
    }

    /// The ISO 4217 code for this currency.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Ngn => "NGN",
            Self::Usd => "USD",
        }
    }
}
