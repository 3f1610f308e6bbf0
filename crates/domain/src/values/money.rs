//! Monetary amounts with currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// A non-negative monetary amount in a specific currency.
///
/// Arithmetic requires matching currencies; mixing currencies is a
/// programming error reported as an invariant violation, never silently
/// converted. Subtraction below zero fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    /// Creates a money value, validating amount and currency code.
    pub fn new(amount: Decimal, currency: &str) -> Result<Self, InvariantViolation> {
        if amount < Decimal::ZERO {
            return Err(InvariantViolation::NegativeAmount(amount));
        }
        let currency = normalize_currency(currency)?;
        Ok(Self { amount, currency })
    }

    /// Creates a zero amount in the given currency.
    pub fn zero(currency: &str) -> Result<Self, InvariantViolation> {
        Self::new(Decimal::ZERO, currency)
    }

    /// Creates a zero amount in US dollars.
    pub fn zero_usd() -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }

    /// Creates a zero amount in this value's currency.
    pub fn zero_like(&self) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency: self.currency.clone(),
        }
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the 3-letter currency code.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds another amount of the same currency.
    pub fn add(&self, other: &Money) -> Result<Money, InvariantViolation> {
        self.require_same_currency(other)?;
        Ok(Self {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Subtracts another amount of the same currency; going below zero fails.
    pub fn subtract(&self, other: &Money) -> Result<Money, InvariantViolation> {
        self.require_same_currency(other)?;
        if other.amount > self.amount {
            return Err(InvariantViolation::AmountUnderflow {
                minuend: self.amount,
                subtrahend: other.amount,
            });
        }
        Ok(Self {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Self {
            amount: self.amount * Decimal::from(quantity),
            currency: self.currency.clone(),
        }
    }

    fn require_same_currency(&self, other: &Money) -> Result<(), InvariantViolation> {
        if self.currency != other.currency {
            return Err(InvariantViolation::CurrencyMismatch {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

fn normalize_currency(currency: &str) -> Result<String, InvariantViolation> {
    let trimmed = currency.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(InvariantViolation::InvalidCurrency(currency.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
