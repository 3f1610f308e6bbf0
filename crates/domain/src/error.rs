//! Domain error taxonomy.

use common::{OrderId, PaymentId, ProductId, ShipmentId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::RepositoryError;

/// Invariant violations raised by value objects and aggregate internals.
///
/// These indicate a programming or data-integrity error rather than bad
/// user input; they are always fatal to the operation and never silently
/// corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("money amount cannot be negative: {0}")]
    NegativeAmount(Decimal),

    #[error("currency must be exactly 3 letters, got {0:?}")]
    InvalidCurrency(String),

    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    #[error("subtracting {subtrahend} from {minuend} would produce a negative amount")]
    AmountUnderflow { minuend: Decimal, subtrahend: Decimal },

    #[error("SKU must be 3-20 alphanumeric characters, got {0:?}")]
    InvalidSku(String),

    #[error("stock cannot go below zero: {current} - {subtracted}")]
    StockUnderflow { current: u32, subtracted: u32 },

    #[error("order number must match ORD-YYYYMMDD-XXXXX, got {0:?}")]
    InvalidOrderNumber(String),

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("invalid address field {field}: {message}")]
    InvalidAddress {
        field: &'static str,
        message: String,
    },

    #[error("tracking number must be 5-50 alphanumeric characters, got {0:?}")]
    InvalidTrackingNumber(String),

    #[error("magnitude cannot be negative: {0}")]
    NegativeMagnitude(Decimal),

    #[error("quantity must be greater than zero")]
    ZeroQuantity,
}

/// A single violated validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// The offending command field.
    pub field: &'static str,

    /// Human-readable description of the violated rule.
    pub message: String,
}

/// Aggregated structural validation failures for one command.
///
/// The validation pipeline collects every violated rule before reporting,
/// so a caller sees the full list at once rather than one failure per
/// round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violated rule.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Returns `Ok` when no rule was violated, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation failed")?;
        for v in &self.violations {
            write!(f, "; {}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors surfaced by domain operations and command handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("payment not found: {0}")]
    PaymentNotFound(PaymentId),

    #[error("shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// Deletion blocked because at least one order references the product.
    #[error("product {0} is referenced by existing orders and cannot be deleted")]
    ProductInUse(ProductId),

    /// A status change not permitted by the relevant state machine.
    #[error("invalid {entity} status transition: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// An action rejected by the aggregate's current status.
    #[error("{entity} in status {status} does not permit {action}")]
    ActionNotAllowed {
        entity: &'static str,
        status: &'static str,
        action: &'static str,
    },

    /// A payment status update that names the current status.
    #[error("payment status is already {0}")]
    AlreadyInStatus(&'static str),

    /// A status change attempted out of a terminal status.
    #[error("{entity} status {status} is terminal and cannot change")]
    TerminalStatus {
        entity: &'static str,
        status: &'static str,
    },

    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Referenced product is missing or inactive at order-placement time.
    #[error("product {0} is not available for ordering")]
    ProductUnavailable(ProductId),

    #[error("order has no detail for product {0}")]
    OrderDetailNotFound(ProductId),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_aggregate_all_rules() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "must not be empty");
        errors.push("quantity", "must be at least 1");

        assert_eq!(errors.violations().len(), 2);
        let message = errors.to_string();
        assert!(message.contains("name: must not be empty"));
        assert!(message.contains("quantity: must be at least 1"));
    }

    #[test]
    fn empty_validation_errors_convert_to_ok() {
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn non_empty_validation_errors_convert_to_err() {
        let mut errors = ValidationErrors::new();
        errors.push("sku", "too short");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn insufficient_stock_carries_amounts() {
        let id = ProductId::new();
        let err = DomainError::InsufficientStock {
            product_id: id,
            requested: 7,
            available: 3,
        };
        let message = err.to_string();
        assert!(message.contains("requested 7"));
        assert!(message.contains("available 3"));
    }
}
