//! Domain layer for the commerce order-management core.
//!
//! This crate provides:
//! - Value objects (`Money`, `Sku`, `StockQuantity`, `OrderNumber`, `Email`,
//!   `Address`, `TrackingNumber`, `Weight`, `Dimensions`)
//! - The four aggregates (`Product`, `Order`, `Payment`, `Shipment`) with
//!   their status state machines and recorded domain events
//! - The `DomainEvent` and `AggregateRoot` abstractions
//! - Repository and unit-of-work contracts implemented by the persistence
//!   collaborator

pub mod aggregate;
pub mod error;
pub mod order;
pub mod payment;
pub mod product;
pub mod repository;
pub mod shipment;
pub mod values;

pub use aggregate::{AggregateRoot, Audit, DomainEvent};
pub use error::{DomainError, FieldViolation, InvariantViolation, ValidationErrors};
pub use order::{Order, OrderDetail, OrderEvent, OrderStatus};
pub use payment::{Payment, PaymentEvent, PaymentStatus};
pub use product::{Product, ProductEvent, ProductImage};
pub use repository::{
    OrderRepository, PaymentRepository, ProductRepository, RepositoryError, ShipmentRepository,
    Store, UnitOfWork,
};
pub use shipment::{Shipment, ShipmentEvent, ShipmentItem, ShipmentStatus, TrackingDetail};
pub use values::{
    Address, Dimensions, DimensionUnit, Email, Money, OrderNumber, Sku, StockQuantity,
    TrackingNumber, Weight, WeightUnit,
};
