//! Product domain events.

use chrono::{DateTime, Utc};
use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events recorded by the product aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was created.
    Created(ProductCreatedData),

    /// Product attributes were updated.
    Updated(ProductUpdatedData),

    /// Stock level changed.
    StockChanged(ProductStockChangedData),

    /// Stock fell to or below the low-stock threshold.
    StockLow(ProductStockLowData),
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::Created(_) => "ProductCreated",
            ProductEvent::Updated(_) => "ProductUpdated",
            ProductEvent::StockChanged(_) => "ProductStockChanged",
            ProductEvent::StockLow(_) => "ProductStockLow",
        }
    }
}

/// Data for the ProductCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreatedData {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Data for the ProductUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpdatedData {
    pub product_id: ProductId,
    pub updated_at: DateTime<Utc>,
}

/// Data for the ProductStockChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockChangedData {
    pub product_id: ProductId,
    pub old_stock: u32,
    pub new_stock: u32,
    pub changed_at: DateTime<Utc>,
}

/// Data for the ProductStockLow event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStockLowData {
    pub product_id: ProductId,
    pub stock: u32,
    pub threshold: u32,
    pub observed_at: DateTime<Utc>,
}

impl ProductEvent {
    /// Creates a ProductCreated event.
    pub fn created(product_id: ProductId, sku: impl Into<String>, name: impl Into<String>) -> Self {
        ProductEvent::Created(ProductCreatedData {
            product_id,
            sku: sku.into(),
            name: name.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates a ProductUpdated event.
    pub fn updated(product_id: ProductId) -> Self {
        ProductEvent::Updated(ProductUpdatedData {
            product_id,
            updated_at: Utc::now(),
        })
    }

    /// Creates a ProductStockChanged event.
    pub fn stock_changed(product_id: ProductId, old_stock: u32, new_stock: u32) -> Self {
        ProductEvent::StockChanged(ProductStockChangedData {
            product_id,
            old_stock,
            new_stock,
            changed_at: Utc::now(),
        })
    }

    /// Creates a ProductStockLow event.
    pub fn stock_low(product_id: ProductId, stock: u32, threshold: u32) -> Self {
        ProductEvent::StockLow(ProductStockLowData {
            product_id,
            stock,
            threshold,
            observed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types() {
        let id = ProductId::new();
        assert_eq!(
            ProductEvent::created(id, "SKU1A", "Widget").event_type(),
            "ProductCreated"
        );
        assert_eq!(ProductEvent::updated(id).event_type(), "ProductUpdated");
        assert_eq!(
            ProductEvent::stock_changed(id, 10, 3).event_type(),
            "ProductStockChanged"
        );
        assert_eq!(
            ProductEvent::stock_low(id, 3, 5).event_type(),
            "ProductStockLow"
        );
    }

    #[test]
    fn serialization_carries_payload() {
        let id = ProductId::new();
        let event = ProductEvent::stock_changed(id, 10, 3);
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: ProductEvent = serde_json::from_str(&json).unwrap();

        if let ProductEvent::StockChanged(data) = deserialized {
            assert_eq!(data.product_id, id);
            assert_eq!(data.old_stock, 10);
            assert_eq!(data.new_stock, 3);
        } else {
            panic!("expected StockChanged event");
        }
    }
}
