//! Monetary amounts in minor currency units.
//!
//! The processor transmits amounts as decimal text (`"190.98"`). [`Money`] stores
//! the amount as an integer count of minor units so arithmetic never touches
//! floating point.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::error::{CheckoutError, Result};

/// Currency assumed when the protocol omits one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Immutable amount and currency pair.
///
/// # Examples
///
/// ```
/// use google_checkout::money::Money;
///
/// let total = Money::from_decimal_str("190.98", "USD").unwrap();
/// assert_eq!(total.amount_minor_units(), 19098);
/// assert_eq!(total.currency_code(), "USD");
/// assert_eq!(total.to_string(), "190.98 USD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money {
    amount_minor_units: i64,
    currency_code: String,
}

impl Money {
    /// Creates a value from an amount already expressed in minor units.
    #[must_use]
    pub fn new(amount_minor_units: i64, currency_code: impl Into<String>) -> Self {
        Self { amount_minor_units, currency_code: currency_code.into() }
    }

    /// Parses decimal text and rounds it to the nearest minor unit.
    ///
    /// Midpoints round away from zero, so `"0.005"` becomes one cent.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MalformedDocument`] if `text` is not a decimal number and
    /// [`CheckoutError::InvalidAmount`] if the result does not fit in an `i64`.
    pub fn from_decimal_str(text: &str, currency_code: impl Into<String>) -> Result<Self> {
        let trimmed = text.trim();
        let value: Decimal = trimmed.parse().map_err(|e| {
            CheckoutError::MalformedDocument(format!("'{trimmed}' is not a decimal amount: {e}"))
        })?;
        Self::from_decimal(value, currency_code)
    }

    /// Converts a decimal major-unit amount to minor units.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidAmount`] if the result does not fit in an `i64`.
    pub fn from_decimal(value: Decimal, currency_code: impl Into<String>) -> Result<Self> {
        let minor = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|v| v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|v| v.to_i64())
            .ok_or_else(|| CheckoutError::InvalidAmount(format!("{value} is out of range")))?;
        Ok(Self::new(minor, currency_code))
    }

    /// Amount as an integer number of minor units (cents for USD).
    #[must_use]
    pub const fn amount_minor_units(&self) -> i64 {
        self.amount_minor_units
    }

    /// ISO currency code, e.g. `"USD"`.
    #[must_use]
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    /// Amount in major units with two decimal places.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount_minor_units, 2)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_decimal(), self.currency_code)
    }
}
