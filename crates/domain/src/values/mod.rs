//! Value objects for the commerce domain.
//!
//! All types here are immutable, validated at construction, and compared
//! by value. Conversions to primitives go through explicit accessors.

mod contact;
mod money;
mod order_number;
mod shipping;
mod sku;
mod stock;

pub use contact::{Address, Email};
pub use money::Money;
pub use order_number::OrderNumber;
pub use shipping::{DimensionUnit, Dimensions, TrackingNumber, Weight, WeightUnit};
pub use sku::Sku;
pub use stock::StockQuantity;
