//! Order domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::OrderStatus;

/// Events recorded by the order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed.
    Placed(OrderPlacedData),

    /// A detail line was added or merged.
    DetailAdded(OrderDetailAddedData),

    /// A detail line was removed.
    DetailRemoved(OrderDetailRemovedData),

    /// Customer info or shipping address changed.
    Updated(OrderUpdatedData),

    /// Status changed.
    StatusChanged(OrderStatusChangedData),

    /// Order was cancelled.
    Cancelled(OrderCancelledData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::DetailAdded(_) => "OrderDetailAdded",
            OrderEvent::DetailRemoved(_) => "OrderDetailRemoved",
            OrderEvent::Updated(_) => "OrderUpdated",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::Cancelled(_) => "OrderCancelled",
        }
    }
}

/// Data for the OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: OrderId,
    pub order_number: String,
    pub customer_email: String,
    pub placed_at: DateTime<Utc>,
}

/// Data for the OrderDetailAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailAddedData {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// Data for the OrderDetailRemoved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetailRemovedData {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub removed_at: DateTime<Utc>,
}

/// Data for the OrderUpdated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdatedData {
    pub order_id: OrderId,
    pub updated_at: DateTime<Utc>,
}

/// Data for the OrderStatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedData {
    pub order_id: OrderId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// Data for the OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    pub order_id: OrderId,
    pub reason: String,
    pub cancelled_by: String,
    pub cancelled_at: DateTime<Utc>,
}

impl OrderEvent {
    /// Creates an OrderPlaced event.
    pub fn placed(
        order_id: OrderId,
        order_number: impl Into<String>,
        customer_email: impl Into<String>,
    ) -> Self {
        OrderEvent::Placed(OrderPlacedData {
            order_id,
            order_number: order_number.into(),
            customer_email: customer_email.into(),
            placed_at: Utc::now(),
        })
    }

    /// Creates an OrderDetailAdded event.
    pub fn detail_added(order_id: OrderId, product_id: ProductId, quantity: u32) -> Self {
        OrderEvent::DetailAdded(OrderDetailAddedData {
            order_id,
            product_id,
            quantity,
            added_at: Utc::now(),
        })
    }

    /// Creates an OrderDetailRemoved event.
    pub fn detail_removed(order_id: OrderId, product_id: ProductId) -> Self {
        OrderEvent::DetailRemoved(OrderDetailRemovedData {
            order_id,
            product_id,
            removed_at: Utc::now(),
        })
    }

    /// Creates an OrderUpdated event.
    pub fn updated(order_id: OrderId) -> Self {
        OrderEvent::Updated(OrderUpdatedData {
            order_id,
            updated_at: Utc::now(),
        })
    }

    /// Creates an OrderStatusChanged event.
    pub fn status_changed(
        order_id: OrderId,
        old_status: OrderStatus,
        new_status: OrderStatus,
    ) -> Self {
        OrderEvent::StatusChanged(OrderStatusChangedData {
            order_id,
            old_status,
            new_status,
            changed_at: Utc::now(),
        })
    }

    /// Creates an OrderCancelled event.
    pub fn cancelled(
        order_id: OrderId,
        reason: impl Into<String>,
        cancelled_by: impl Into<String>,
    ) -> Self {
        OrderEvent::Cancelled(OrderCancelledData {
            order_id,
            reason: reason.into(),
            cancelled_by: cancelled_by.into(),
            cancelled_at: Utc::now(),
        })
    }
}
