//! Application layer for the commerce order-management core.
//!
//! One command type per use case, a structural validation pipeline that
//! runs before every handler, and a service per aggregate that loads
//! state, invokes aggregate behavior, stages writes, and commits one unit
//! of work per request. Handlers return the mutated aggregate with its
//! recorded events still attached and propagate domain errors untouched.

pub mod command;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shipments;

pub use command::{AddressInput, Command, ensure_valid};
pub use orders::{
    CancelOrder, OrderLine, OrderService, PlaceOrder, UpdateOrderCustomerInfo, UpdateOrderNotes,
    UpdateOrderShippingAddress, UpdateOrderStatus,
};
pub use payments::{CreatePayment, PaymentService, UpdatePaymentStatus};
pub use products::{
    AddProductDetail, AddProductImage, CreateProduct, DecreaseProductStock, DeleteProduct,
    IncreaseProductStock, ProductService, RemoveProductDetail, RemoveProductImage, UpdateProduct,
    UpdateProductStock,
};
pub use shipments::{
    AddTrackingUpdate, CreateShipment, ShipmentService, UpdateCarrierInfo, UpdateShipmentStatus,
};
