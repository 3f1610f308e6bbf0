//! Customer contact value objects.

use serde::{Deserialize, Serialize};

use crate::error::InvariantViolation;

const MAX_EMAIL_LEN: usize = 320;

/// A validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Creates an email address, checking length and overall shape.
    pub fn new(value: &str) -> Result<Self, InvariantViolation> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_EMAIL_LEN || !has_email_shape(trimmed) {
            return Err(InvariantViolation::InvalidEmail(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn has_email_shape(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // The domain needs at least one dot with labels on both sides.
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const MAX_STREET_LEN: usize = 200;
const MAX_CITY_LEN: usize = 100;
const MAX_STATE_LEN: usize = 100;
const MAX_POSTAL_LEN: usize = 20;
const MAX_COUNTRY_LEN: usize = 100;

/// A postal address with required, length-bounded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    street: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
}

impl Address {
    /// Creates an address, validating every field.
    pub fn new(
        street: &str,
        city: &str,
        state: &str,
        postal_code: &str,
        country: &str,
    ) -> Result<Self, InvariantViolation> {
        Ok(Self {
            street: required_field("street", street, MAX_STREET_LEN)?,
            city: required_field("city", city, MAX_CITY_LEN)?,
            state: required_field("state", state, MAX_STATE_LEN)?,
            postal_code: required_field("postal_code", postal_code, MAX_POSTAL_LEN)?,
            country: required_field("country", country, MAX_COUNTRY_LEN)?,
        })
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

fn required_field(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<String, InvariantViolation> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InvariantViolation::InvalidAddress {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if trimmed.len() > max_len {
        return Err(InvariantViolation::InvalidAddress {
            field,
            message: format!("must not exceed {max_len} characters"),
        });
    }
    Ok(trimmed.to_string())
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {}, {} {}, {}",
            self.street, self.city, self.state, self.postal_code, self.country
        )
    }
}
