//! Order numbers.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

const PREFIX: &str = "ORD";
const SUFFIX_LEN: usize = 5;
const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A human-facing order number of the form `ORD-YYYYMMDD-XXXXX`.
///
/// Generated at order-placement time from an injected random source so
/// constructors stay deterministic under a seeded RNG. Global uniqueness
/// is not a domain concern; the store enforces it with a uniqueness
/// constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a new order number for the given date.
    pub fn generate(date: NaiveDate, rng: &mut impl Rng) -> Self {
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();
        Self(format!("{PREFIX}-{}-{suffix}", date.format("%Y%m%d")))
    }

    /// Parses an existing order number, validating its shape.
    pub fn parse(value: &str) -> Result<Self, InvariantViolation> {
        let invalid = || InvariantViolation::InvalidOrderNumber(value.to_string());

        let mut parts = value.splitn(3, '-');
        let (prefix, date, suffix) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(d), Some(s)) => (p, d, s),
            _ => return Err(invalid()),
        };
        if prefix != PREFIX
            || date.len() != 8
            || !date.chars().all(|c| c.is_ascii_digit())
            || suffix.len() != SUFFIX_LEN
            || !suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(invalid());
        }
        Ok(Self(value.to_string()))
    }

    /// Returns the order number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
