//! Repository and unit-of-work contracts.
//!
//! The core defines these traits; the persistence collaborator implements
//! them. Write methods *stage* changes with the current unit of work —
//! nothing becomes visible to readers until [`UnitOfWork::commit`] applies
//! every staged change atomically.

use async_trait::async_trait;
use common::{OrderId, PaymentId, ProductId, ShipmentId};
use thiserror::Error;

use crate::order::Order;
use crate::payment::Payment;
use crate::product::Product;
use crate::shipment::Shipment;
use crate::values::{OrderNumber, Sku, TrackingNumber};

/// Errors surfaced by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// A conditional stock decrement found less stock than requested at
    /// commit time. The whole commit is rolled back.
    #[error(
        "stock conflict for product {product_id}: requested {requested}, available {available}"
    )]
    StockConflict {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The storage-level uniqueness constraint on order numbers fired.
    #[error("order number already exists: {0}")]
    DuplicateOrderNumber(String),

    /// A staged update or delete referenced a row that no longer exists.
    #[error("missing {entity} row: {id}")]
    MissingRow { entity: &'static str, id: String },

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence contract for the product aggregate.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Loads a product by id.
    async fn get_product(&self, id: ProductId) -> RepositoryResult<Option<Product>>;

    /// Loads a product together with its details and images.
    async fn get_product_with_children(&self, id: ProductId) -> RepositoryResult<Option<Product>>;

    /// Looks a product up by its natural key.
    async fn product_by_sku(&self, sku: &Sku) -> RepositoryResult<Option<Product>>;

    /// Returns all products for read-side projection and filtering.
    async fn list_products(&self) -> RepositoryResult<Vec<Product>>;

    /// Stages an insert.
    async fn add_product(&self, product: Product) -> RepositoryResult<()>;

    /// Stages an update.
    async fn update_product(&self, product: Product) -> RepositoryResult<()>;

    /// Stages a delete.
    async fn delete_product(&self, id: ProductId) -> RepositoryResult<()>;

    /// Stages a conditional stock decrement.
    ///
    /// The decrement succeeds at commit time only if the resulting stock is
    /// non-negative; otherwise the commit fails with
    /// [`RepositoryError::StockConflict`] and applies nothing.
    async fn decrement_stock(&self, id: ProductId, quantity: u32) -> RepositoryResult<()>;
}

/// Persistence contract for the order aggregate.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Loads an order by id.
    async fn get_order(&self, id: OrderId) -> RepositoryResult<Option<Order>>;

    /// Loads an order together with its details.
    async fn get_order_with_details(&self, id: OrderId) -> RepositoryResult<Option<Order>>;

    /// Looks an order up by its natural key.
    async fn order_by_number(&self, number: &OrderNumber) -> RepositoryResult<Option<Order>>;

    /// Returns all orders for read-side projection and filtering.
    async fn list_orders(&self) -> RepositoryResult<Vec<Order>>;

    /// Returns true if any order detail references the product.
    async fn order_references_product(&self, id: ProductId) -> RepositoryResult<bool>;

    /// Stages an insert.
    async fn add_order(&self, order: Order) -> RepositoryResult<()>;

    /// Stages an update.
    async fn update_order(&self, order: Order) -> RepositoryResult<()>;

    /// Stages a delete.
    async fn delete_order(&self, id: OrderId) -> RepositoryResult<()>;
}

/// Persistence contract for the payment aggregate.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Loads a payment by id.
    async fn get_payment(&self, id: PaymentId) -> RepositoryResult<Option<Payment>>;

    /// Returns all payments recorded against an order.
    async fn payments_for_order(&self, order_id: OrderId) -> RepositoryResult<Vec<Payment>>;

    /// Returns all payments for read-side projection and filtering.
    async fn list_payments(&self) -> RepositoryResult<Vec<Payment>>;

    /// Stages an insert.
    async fn add_payment(&self, payment: Payment) -> RepositoryResult<()>;

    /// Stages an update.
    async fn update_payment(&self, payment: Payment) -> RepositoryResult<()>;

    /// Stages a delete.
    async fn delete_payment(&self, id: PaymentId) -> RepositoryResult<()>;
}

/// Persistence contract for the shipment aggregate.
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    /// Loads a shipment by id.
    async fn get_shipment(&self, id: ShipmentId) -> RepositoryResult<Option<Shipment>>;

    /// Loads a shipment together with its tracking history and items.
    async fn get_shipment_with_children(
        &self,
        id: ShipmentId,
    ) -> RepositoryResult<Option<Shipment>>;

    /// Looks a shipment up by its natural key.
    async fn shipment_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> RepositoryResult<Option<Shipment>>;

    /// Returns all shipments for read-side projection and filtering.
    async fn list_shipments(&self) -> RepositoryResult<Vec<Shipment>>;

    /// Stages an insert.
    async fn add_shipment(&self, shipment: Shipment) -> RepositoryResult<()>;

    /// Stages an update.
    async fn update_shipment(&self, shipment: Shipment) -> RepositoryResult<()>;

    /// Stages a delete.
    async fn delete_shipment(&self, id: ShipmentId) -> RepositoryResult<()>;
}

/// The durability boundary for one request.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Durably applies every staged change, all or nothing, and returns the
    /// number of affected records. Handlers commit at most once per request.
    async fn commit(&self) -> RepositoryResult<u64>;
}

/// Entry point to the persistence collaborator.
///
/// A store opens one unit of work per request; the unit of work carries
/// every repository contract, so changes staged through its repositories
/// all land in the same commit. Units of work are never shared between
/// requests.
pub trait Store: Send + Sync {
    /// The request-scoped unit of work.
    type Uow: ProductRepository
        + OrderRepository
        + PaymentRepository
        + ShipmentRepository
        + UnitOfWork;

    /// Opens a unit of work scoped to the current request.
    fn begin(&self) -> Self::Uow;
}
