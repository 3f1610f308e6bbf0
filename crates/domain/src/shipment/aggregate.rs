//! Shipment aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, ShipmentId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateRoot, Audit};
use crate::error::DomainError;
use crate::values::{Address, Dimensions, Money, TrackingNumber, Weight};

use super::{ShipmentEvent, ShipmentStatus};

/// One entry in a shipment's tracking history.
///
/// The history is append-only; entries are never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingDetail {
    status: ShipmentStatus,
    location: Option<String>,
    notes: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TrackingDetail {
    fn new(status: ShipmentStatus, location: Option<String>, notes: Option<String>) -> Self {
        Self {
            status,
            location,
            notes,
            timestamp: Utc::now(),
        }
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A snapshot of a product and quantity included in a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentItem {
    product_id: ProductId,
    product_name: String,
    quantity: u32,
}

impl ShipmentItem {
    pub fn new(product_id: ProductId, product_name: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Shipment aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    id: ShipmentId,
    order_id: OrderId,
    tracking_number: TrackingNumber,
    carrier: String,
    status: ShipmentStatus,
    origin_address: Address,
    destination_address: Address,
    weight: Weight,
    dimensions: Dimensions,
    shipping_cost: Money,
    estimated_delivery_date: Option<DateTime<Utc>>,
    actual_delivery_date: Option<DateTime<Utc>>,
    tracking_details: Vec<TrackingDetail>,
    items: Vec<ShipmentItem>,
    audit: Audit,
    #[serde(skip)]
    events: Vec<ShipmentEvent>,
}

impl AggregateRoot for Shipment {
    type Event = ShipmentEvent;

    fn events(&self) -> &[ShipmentEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<ShipmentEvent> {
        std::mem::take(&mut self.events)
    }
}

// Query methods
impl Shipment {
    pub fn id(&self) -> ShipmentId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.tracking_number
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn status(&self) -> ShipmentStatus {
        self.status
    }

    pub fn origin_address(&self) -> &Address {
        &self.origin_address
    }

    pub fn destination_address(&self) -> &Address {
        &self.destination_address
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn shipping_cost(&self) -> &Money {
        &self.shipping_cost
    }

    pub fn estimated_delivery_date(&self) -> Option<DateTime<Utc>> {
        self.estimated_delivery_date
    }

    pub fn actual_delivery_date(&self) -> Option<DateTime<Utc>> {
        self.actual_delivery_date
    }

    pub fn tracking_details(&self) -> &[TrackingDetail] {
        &self.tracking_details
    }

    pub fn items(&self) -> &[ShipmentItem] {
        &self.items
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Behavior methods
impl Shipment {
    /// Creates a new pending shipment for an order.
    ///
    /// The tracking history starts with a Pending entry.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: ShipmentId,
        order_id: OrderId,
        tracking_number: TrackingNumber,
        carrier: impl Into<String>,
        origin_address: Address,
        destination_address: Address,
        weight: Weight,
        dimensions: Dimensions,
        shipping_cost: Money,
        estimated_delivery_date: Option<DateTime<Utc>>,
        items: Vec<ShipmentItem>,
        actor: &str,
    ) -> Self {
        let mut shipment = Self {
            id,
            order_id,
            tracking_number: tracking_number.clone(),
            carrier: carrier.into(),
            status: ShipmentStatus::Pending,
            origin_address,
            destination_address,
            weight,
            dimensions,
            shipping_cost,
            estimated_delivery_date,
            actual_delivery_date: None,
            tracking_details: vec![TrackingDetail::new(ShipmentStatus::Pending, None, None)],
            items,
            audit: Audit::new(actor),
            events: Vec::new(),
        };
        shipment.record(ShipmentEvent::created(
            id,
            order_id,
            tracking_number.as_str(),
        ));
        shipment
    }

    /// Moves the shipment to a new status, appending a tracking entry.
    ///
    /// The transition into Delivered stamps the actual delivery date.
    pub fn update_status(
        &mut self,
        new_status: ShipmentStatus,
        location: Option<String>,
        notes: Option<String>,
        actor: &str,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidTransition {
                entity: "shipment",
                from: self.status.as_str(),
                to: new_status.as_str(),
            });
        }

        let old = self.status;
        self.status = new_status;
        if new_status == ShipmentStatus::Delivered {
            self.actual_delivery_date = Some(Utc::now());
        }
        self.tracking_details
            .push(TrackingDetail::new(new_status, location.clone(), notes));
        self.audit.touch(actor);
        self.record(ShipmentEvent::status_changed(
            self.id, old, new_status, location,
        ));
        Ok(())
    }

    /// Appends a location/notes tracking entry without changing status.
    pub fn add_tracking_update(
        &mut self,
        location: Option<String>,
        notes: Option<String>,
        actor: &str,
    ) {
        self.tracking_details.push(TrackingDetail::new(
            self.status,
            location.clone(),
            notes.clone(),
        ));
        self.audit.touch(actor);
        self.record(ShipmentEvent::tracking_added(self.id, location, notes));
    }

    /// Updates carrier and/or tracking number; allowed only while Pending.
    pub fn update_carrier_info(
        &mut self,
        carrier: Option<String>,
        tracking_number: Option<TrackingNumber>,
        actor: &str,
    ) -> Result<(), DomainError> {
        if self.status != ShipmentStatus::Pending {
            return Err(DomainError::ActionNotAllowed {
                entity: "shipment",
                status: self.status.as_str(),
                action: "update carrier info",
            });
        }
        if let Some(carrier) = carrier {
            self.carrier = carrier;
        }
        if let Some(tracking_number) = tracking_number {
            self.tracking_number = tracking_number;
        }
        self.audit.touch(actor);
        Ok(())
    }

    fn record(&mut self, event: ShipmentEvent) {
        self.events.push(event);
    }
}
