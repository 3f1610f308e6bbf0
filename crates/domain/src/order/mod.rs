//! Order aggregate.

mod aggregate;
mod events;
mod status;

pub use aggregate::{Order, OrderDetail};
pub use events::{
    OrderCancelledData, OrderDetailAddedData, OrderDetailRemovedData, OrderEvent, OrderPlacedData,
    OrderStatusChangedData, OrderUpdatedData,
};
pub use status::OrderStatus;
