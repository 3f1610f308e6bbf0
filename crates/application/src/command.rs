//! Command trait and structural validation pipeline.
//!
//! Every command runs through [`ensure_valid`] before its handler executes.
//! Validation is purely structural (required fields, length bounds, numeric
//! ranges, non-empty line lists) and never touches the store; existence
//! checks belong to the handlers.

use domain::{Address, DomainError, ValidationErrors};
use rust_decimal::Decimal;

/// A use-case command carrying all inputs its handler needs.
pub trait Command: Send + Sync {
    /// Reports every violated structural rule to the given collector.
    fn validate(&self, report: &mut ValidationErrors);
}

/// Runs field-level validation for a command.
///
/// All violations are aggregated into one error; handlers never run with
/// invalid input.
pub fn ensure_valid<C: Command>(command: &C) -> Result<(), DomainError> {
    let mut report = ValidationErrors::new();
    command.validate(&mut report);
    report.into_result().map_err(DomainError::from)
}

/// Raw address fields as carried by commands.
///
/// Structural bounds are checked by the pipeline; the handler converts the
/// input into a validated [`Address`] value object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl AddressInput {
    pub(crate) fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "street", &self.street, 200);
        require_text(report, "city", &self.city, 100);
        require_text(report, "state", &self.state, 100);
        require_text(report, "postal_code", &self.postal_code, 20);
        require_text(report, "country", &self.country, 100);
    }

    pub(crate) fn to_address(&self) -> Result<Address, DomainError> {
        Ok(Address::new(
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        )?)
    }
}

pub(crate) fn require_text(
    report: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_len: usize,
) {
    if value.trim().is_empty() {
        report.push(field, "must not be empty");
    } else if value.len() > max_len {
        report.push(field, format!("must not exceed {max_len} characters"));
    }
}

pub(crate) fn optional_text(
    report: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    max_len: usize,
) {
    if let Some(value) = value
        && value.len() > max_len
    {
        report.push(field, format!("must not exceed {max_len} characters"));
    }
}

pub(crate) fn require_positive(report: &mut ValidationErrors, field: &'static str, value: u32) {
    if value == 0 {
        report.push(field, "must be at least 1");
    }
}

pub(crate) fn require_non_negative(
    report: &mut ValidationErrors,
    field: &'static str,
    value: Decimal,
) {
    if value < Decimal::ZERO {
        report.push(field, "must not be negative");
    }
}

pub(crate) fn require_currency(report: &mut ValidationErrors, field: &'static str, value: &str) {
    let trimmed = value.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        report.push(field, "must be a 3-letter currency code");
    }
}

pub(crate) fn require_email_shape(
    report: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) {
    require_text(report, field, value, 320);
    if !value.trim().is_empty() && !value.contains('@') {
        report.push(field, "must be a valid email address");
    }
}
