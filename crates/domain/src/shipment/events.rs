//! Shipment domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::ShipmentStatus;

/// Events recorded by the shipment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShipmentEvent {
    /// Shipment was created.
    Created(ShipmentCreatedData),

    /// Status changed.
    StatusChanged(ShipmentStatusChangedData),

    /// A tracking update was appended without a status change.
    TrackingAdded(ShipmentTrackingAddedData),
}

impl DomainEvent for ShipmentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ShipmentEvent::Created(_) => "ShipmentCreated",
            ShipmentEvent::StatusChanged(_) => "ShipmentStatusChanged",
            ShipmentEvent::TrackingAdded(_) => "ShipmentTrackingAdded",
        }
    }
}

/// Data for the ShipmentCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreatedData {
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub tracking_number: String,
    pub created_at: DateTime<Utc>,
}

/// Data for the ShipmentStatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentStatusChangedData {
    pub shipment_id: ShipmentId,
    pub old_status: ShipmentStatus,
    pub new_status: ShipmentStatus,
    pub location: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Data for the ShipmentTrackingAdded event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentTrackingAddedData {
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl ShipmentEvent {
    /// Creates a ShipmentCreated event.
    pub fn created(
        shipment_id: ShipmentId,
        order_id: OrderId,
        tracking_number: impl Into<String>,
    ) -> Self {
        ShipmentEvent::Created(ShipmentCreatedData {
            shipment_id,
            order_id,
            tracking_number: tracking_number.into(),
            created_at: Utc::now(),
        })
    }

    /// Creates a ShipmentStatusChanged event.
    pub fn status_changed(
        shipment_id: ShipmentId,
        old_status: ShipmentStatus,
        new_status: ShipmentStatus,
        location: Option<String>,
    ) -> Self {
        ShipmentEvent::StatusChanged(ShipmentStatusChangedData {
            shipment_id,
            old_status,
            new_status,
            location,
            changed_at: Utc::now(),
        })
    }

    /// Creates a ShipmentTrackingAdded event.
    pub fn tracking_added(
        shipment_id: ShipmentId,
        location: Option<String>,
        notes: Option<String>,
    ) -> Self {
        ShipmentEvent::TrackingAdded(ShipmentTrackingAddedData {
            shipment_id,
            location,
            notes,
            added_at: Utc::now(),
        })
    }
}
