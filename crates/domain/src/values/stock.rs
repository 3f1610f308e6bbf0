//! Stock quantities.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

/// A non-negative stock level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StockQuantity(u32);

impl StockQuantity {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds stock.
    pub fn add(&self, amount: u32) -> StockQuantity {
        Self(self.0 + amount)
    }

    /// Removes stock; going below zero fails.
    pub fn subtract(&self, amount: u32) -> Result<StockQuantity, InvariantViolation> {
        self.0
            .checked_sub(amount)
            .map(Self)
            .ok_or(InvariantViolation::StockUnderflow {
                current: self.0,
                subtracted: amount,
            })
    }

    /// Returns true if the level is at or below the given threshold.
    pub fn is_at_or_below(&self, threshold: u32) -> bool {
        self.0 <= threshold
    }
}

impl std::fmt::Display for StockQuantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_more_than_available_fails() {
        let stock = StockQuantity::new(5);
        assert!(matches!(
            stock.subtract(6),
            Err(InvariantViolation::StockUnderflow {
                current: 5,
                subtracted: 6
            })
        ));
    }

    #[test]
    fn subtract_everything_yields_zero() {
        let stock = StockQuantity::new(5);
        assert!(stock.subtract(5).unwrap().is_zero());
    }

    #[test]
    fn add_increases_level() {
        assert_eq!(StockQuantity::new(3).add(4).value(), 7);
    }

    #[test]
    fn threshold_check_is_inclusive() {
        let stock = StockQuantity::new(10);
        assert!(stock.is_at_or_below(10));
        assert!(stock.is_at_or_below(11));
        assert!(!stock.is_at_or_below(9));
    }
}
