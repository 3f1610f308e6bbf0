//! Product aggregate.

mod aggregate;
mod events;

pub use aggregate::{Product, ProductImage};
pub use events::{
    ProductCreatedData, ProductEvent, ProductStockChangedData, ProductStockLowData,
    ProductUpdatedData,
};
