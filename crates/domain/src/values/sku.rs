//! Stock-keeping unit identifiers.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

const MIN_LEN: usize = 3;
const MAX_LEN: usize = 20;

/// An uppercase alphanumeric stock-keeping unit, 3-20 characters.
///
/// Lowercase input is normalized on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Creates a SKU, normalizing case and validating shape.
    pub fn new(value: &str) -> Result<Self, InvariantViolation> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.len() < MIN_LEN
            || normalized.len() > MAX_LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(InvariantViolation::InvalidSku(value.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Returns the SKU as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_input_is_normalized() {
        let sku = Sku::new("abc123").unwrap();
        assert_eq!(sku.as_str(), "ABC123");
    }

    #[test]
    fn rejects_too_short() {
        assert!(Sku::new("AB").is_err());
    }

    #[test]
    fn rejects_too_long() {
        assert!(Sku::new(&"A".repeat(21)).is_err());
    }

    #[test]
    fn accepts_boundary_lengths() {
        assert!(Sku::new("ABC").is_ok());
        assert!(Sku::new(&"A".repeat(20)).is_ok());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(Sku::new("ABC-123").is_err());
        assert!(Sku::new("ABC 123").is_err());
    }

    #[test]
    fn equality_by_value() {
        assert_eq!(Sku::new("widget1").unwrap(), Sku::new("WIDGET1").unwrap());
    }
}
