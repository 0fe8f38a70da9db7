//! Minor-unit money adapter.
//!
//! The protocol boundary speaks integer minor units (cents); merchant-side
//! amounts are decimal. Each amount is converted independently, rounding
//! half away from zero, with no distributed rounding across line items.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("money amount must not be negative")]
    Negative,
    #[error("money amount out of range")]
    OutOfRange,
}

/// Integer amount in minor currency units plus an ISO currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount_minor: i64,
    pub currency: String,
}

impl Money {
    pub fn new(amount_minor: i64, currency: impl Into<String>) -> Result<Self, MoneyError> {
        if amount_minor < 0 {
            return Err(MoneyError::Negative);
        }
        Ok(Self {
            amount_minor,
            currency: currency.into(),
        })
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self {
            amount_minor: 0,
            currency: currency.into(),
        }
    }

    /// Convert a decimal merchant-currency amount to minor units.
    pub fn from_decimal(amount: Decimal, currency: impl Into<String>) -> Result<Self, MoneyError> {
        Self::new(to_minor_units(amount)?, currency)
    }

    /// Decimal view of the amount (two fractional digits).
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(self.amount_minor, 2)
    }

    pub fn checked_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        Some(Money {
            amount_minor: self.amount_minor.checked_add(other.amount_minor)?,
            currency: self.currency.clone(),
        })
    }
}

/// Multiply by 100 and round to the nearest integer, half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::OutOfRange)
}

pub fn from_minor_units(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}
