//! Shared identifier types used across the commerce core.

mod types;

pub use types::{OrderId, PaymentId, ProductId, ShipmentId};
