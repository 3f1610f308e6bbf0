//! Shipping-related value objects.

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

const TRACKING_MIN_LEN: usize = 5;
const TRACKING_MAX_LEN: usize = 50;
const TRACKING_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GENERATED_TRACKING_LEN: usize = 12;

/// A carrier tracking number, uppercase alphanumeric, 5-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    /// Creates a tracking number, normalizing case and validating shape.
    pub fn new(value: &str) -> Result<Self, InvariantViolation> {
        let normalized = value.trim().to_ascii_uppercase();
        if normalized.len() < TRACKING_MIN_LEN
            || normalized.len() > TRACKING_MAX_LEN
            || !normalized.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(InvariantViolation::InvalidTrackingNumber(value.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Generates a tracking number from an injected random source.
    pub fn generate(rng: &mut impl Rng) -> Self {
        let value: String = (0..GENERATED_TRACKING_LEN)
            .map(|_| TRACKING_ALPHABET[rng.gen_range(0..TRACKING_ALPHABET.len())] as char)
            .collect();
        Self(value)
    }

    /// Returns the tracking number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit of weight measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightUnit {
    Pounds,
    Kilograms,
}

fn lb_per_kg() -> Decimal {
    Decimal::new(220_462_262, 8)
}

fn kg_per_lb() -> Decimal {
    Decimal::new(45_359_237, 8)
}

/// A non-negative weight with its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    value: Decimal,
    unit: WeightUnit,
}

impl Weight {
    pub fn new(value: Decimal, unit: WeightUnit) -> Result<Self, InvariantViolation> {
        if value < Decimal::ZERO {
            return Err(InvariantViolation::NegativeMagnitude(value));
        }
        Ok(Self { value, unit })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn unit(&self) -> WeightUnit {
        self.unit
    }

    /// Converts to pounds.
    pub fn to_pounds(&self) -> Weight {
        match self.unit {
            WeightUnit::Pounds => self.clone(),
            WeightUnit::Kilograms => Weight {
                value: self.value * lb_per_kg(),
                unit: WeightUnit::Pounds,
            },
        }
    }

    /// Converts to kilograms.
    pub fn to_kilograms(&self) -> Weight {
        match self.unit {
            WeightUnit::Kilograms => self.clone(),
            WeightUnit::Pounds => Weight {
                value: self.value * kg_per_lb(),
                unit: WeightUnit::Kilograms,
            },
        }
    }
}

/// Unit of length measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionUnit {
    Inches,
    Centimeters,
}

fn cm_per_inch() -> Decimal {
    Decimal::new(254, 2)
}

/// Non-negative package dimensions with their unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    length: Decimal,
    width: Decimal,
    height: Decimal,
    unit: DimensionUnit,
}

impl Dimensions {
    pub fn new(
        length: Decimal,
        width: Decimal,
        height: Decimal,
        unit: DimensionUnit,
    ) -> Result<Self, InvariantViolation> {
        for magnitude in [length, width, height] {
            if magnitude < Decimal::ZERO {
                return Err(InvariantViolation::NegativeMagnitude(magnitude));
            }
        }
        Ok(Self {
            length,
            width,
            height,
            unit,
        })
    }

    pub fn length(&self) -> Decimal {
        self.length
    }

    pub fn width(&self) -> Decimal {
        self.width
    }

    pub fn height(&self) -> Decimal {
        self.height
    }

    pub fn unit(&self) -> DimensionUnit {
        self.unit
    }

    /// Converts to centimeters.
    pub fn to_centimeters(&self) -> Dimensions {
        match self.unit {
            DimensionUnit::Centimeters => self.clone(),
            DimensionUnit::Inches => self.scaled(cm_per_inch(), DimensionUnit::Centimeters),
        }
    }

    /// Converts to inches.
    pub fn to_inches(&self) -> Dimensions {
        match self.unit {
            DimensionUnit::Inches => self.clone(),
            DimensionUnit::Centimeters => {
                self.scaled(Decimal::ONE / cm_per_inch(), DimensionUnit::Inches)
            }
        }
    }

    fn scaled(&self, factor: Decimal, unit: DimensionUnit) -> Dimensions {
        Dimensions {
            length: self.length * factor,
            width: self.width * factor,
            height: self.height * factor,
            unit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn tracking_number_normalizes_case() {
        let tn = TrackingNumber::new("abc12345").unwrap();
        assert_eq!(tn.as_str(), "ABC12345");
    }

    #[test]
    fn tracking_number_rejects_bad_lengths() {
        assert!(TrackingNumber::new("AB12").is_err());
        assert!(TrackingNumber::new(&"A".repeat(51)).is_err());
        assert!(TrackingNumber::new(&"A".repeat(50)).is_ok());
        assert!(TrackingNumber::new("AB123").is_ok());
    }

    #[test]
    fn generated_tracking_number_is_valid() {
        let mut rng = StdRng::seed_from_u64(3);
        let tn = TrackingNumber::generate(&mut rng);
        assert!(TrackingNumber::new(tn.as_str()).is_ok());
    }

    #[test]
    fn weight_rejects_negative_values() {
        assert!(Weight::new(Decimal::new(-1, 0), WeightUnit::Pounds).is_err());
    }

    #[test]
    fn weight_conversion_roundtrip_is_close() {
        let original = Weight::new(Decimal::new(10, 0), WeightUnit::Kilograms).unwrap();
        let roundtrip = original.to_pounds().to_kilograms();
        let difference = (roundtrip.value() - original.value()).abs();
        assert!(difference < Decimal::new(1, 3));
    }

    #[test]
    fn weight_conversion_to_same_unit_is_identity() {
        let weight = Weight::new(Decimal::new(5, 0), WeightUnit::Pounds).unwrap();
        assert_eq!(weight.to_pounds(), weight);
    }

    #[test]
    fn dimensions_reject_negative_magnitudes() {
        assert!(
            Dimensions::new(
                Decimal::ONE,
                Decimal::new(-1, 0),
                Decimal::ONE,
                DimensionUnit::Inches
            )
            .is_err()
        );
    }

    #[test]
    fn dimensions_convert_inches_to_centimeters() {
        let dims = Dimensions::new(
            Decimal::new(10, 0),
            Decimal::new(4, 0),
            Decimal::new(2, 0),
            DimensionUnit::Inches,
        )
        .unwrap();
        let cm = dims.to_centimeters();
        assert_eq!(cm.length(), Decimal::new(254, 1));
        assert_eq!(cm.width(), Decimal::new(1016, 2));
        assert_eq!(cm.unit(), DimensionUnit::Centimeters);
    }
}
