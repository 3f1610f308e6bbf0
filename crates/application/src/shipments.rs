//! Shipment commands and their handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::{OrderId, ShipmentId};
use rust_decimal::Decimal;

use domain::{
    DimensionUnit, Dimensions, DomainError, Money, OrderRepository, Shipment, ShipmentItem,
    ShipmentRepository, ShipmentStatus, Store, TrackingNumber, UnitOfWork, ValidationErrors,
    Weight, WeightUnit,
};

use crate::command::{
    AddressInput, Command, ensure_valid, optional_text, require_currency, require_non_negative,
    require_text,
};

/// Command to create a shipment for an order.
///
/// The destination address and the item snapshots come from the order; the
/// tracking number is generated when not supplied.
#[derive(Debug, Clone)]
pub struct CreateShipment {
    pub order_id: OrderId,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub origin_address: AddressInput,
    pub weight_value: Decimal,
    pub weight_unit: WeightUnit,
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub dimension_unit: DimensionUnit,
    pub shipping_cost: Decimal,
    pub currency: String,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub actor: String,
}

impl Command for CreateShipment {
    fn validate(&self, report: &mut ValidationErrors) {
        require_text(report, "carrier", &self.carrier, 100);
        optional_text(report, "tracking_number", self.tracking_number.as_deref(), 50);
        self.origin_address.validate(report);
        require_non_negative(report, "weight_value", self.weight_value);
        require_non_negative(report, "length", self.length);
        require_non_negative(report, "width", self.width);
        require_non_negative(report, "height", self.height);
        require_non_negative(report, "shipping_cost", self.shipping_cost);
        require_currency(report, "currency", &self.currency);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to move a shipment to a new status.
#[derive(Debug, Clone)]
pub struct UpdateShipmentStatus {
    pub shipment_id: ShipmentId,
    pub new_status: ShipmentStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub actor: String,
}

impl Command for UpdateShipmentStatus {
    fn validate(&self, report: &mut ValidationErrors) {
        optional_text(report, "location", self.location.as_deref(), 200);
        optional_text(report, "notes", self.notes.as_deref(), 500);
        require_text(report, "actor", &self.actor, 100);
    }
}

/// Command to append a tracking update without changing status.
#[derive(Debug, Clone)]
pub struct AddTrackingUpdate {
    pub shipment_id: ShipmentId,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub actor: String,
}

impl Command for AddTrackingUpdate {
    fn validate(&self, report: &mut ValidationErrors) {
        optional_text(report, "location", self.location.as_deref(), 200);
        optional_text(report, "notes", self.notes.as_deref(), 500);
        require_text(report, "actor", &self.actor, 100);
        if self.location.is_none() && self.notes.is_none() {
            report.push("location", "location or notes must be provided");
        }
    }
}

/// Command to change carrier and/or tracking number while Pending.
#[derive(Debug, Clone)]
pub struct UpdateCarrierInfo {
    pub shipment_id: ShipmentId,
    pub carrier: Option<String>,
    pub tracking_number: Option<String>,
    pub actor: String,
}

impl Command for UpdateCarrierInfo {
    fn validate(&self, report: &mut ValidationErrors) {
        optional_text(report, "carrier", self.carrier.as_deref(), 100);
        optional_text(report, "tracking_number", self.tracking_number.as_deref(), 50);
        require_text(report, "actor", &self.actor, 100);
        if self.carrier.is_none() && self.tracking_number.is_none() {
            report.push("carrier", "carrier or tracking_number must be provided");
        }
    }
}

/// Command handlers for the shipment aggregate.
pub struct ShipmentService<S> {
    store: Arc<S>,
}

impl<S: Store> ShipmentService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a pending shipment for an existing order.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn create_shipment(&self, cmd: CreateShipment) -> Result<Shipment, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let order = db
            .get_order_with_details(cmd.order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(cmd.order_id))?;

        let tracking_number = match &cmd.tracking_number {
            Some(value) => TrackingNumber::new(value)?,
            None => TrackingNumber::generate(&mut rand::thread_rng()),
        };
        let origin = cmd.origin_address.to_address()?;
        let weight = Weight::new(cmd.weight_value, cmd.weight_unit)?;
        let dimensions = Dimensions::new(cmd.length, cmd.width, cmd.height, cmd.dimension_unit)?;
        let shipping_cost = Money::new(cmd.shipping_cost, &cmd.currency)?;
        let items = order
            .details()
            .iter()
            .map(|d| ShipmentItem::new(d.product_id(), d.product_name(), d.quantity()))
            .collect();

        let shipment = Shipment::create(
            ShipmentId::new(),
            order.id(),
            tracking_number,
            cmd.carrier,
            origin,
            order.shipping_address().clone(),
            weight,
            dimensions,
            shipping_cost,
            cmd.estimated_delivery_date,
            items,
            &cmd.actor,
        );

        db.add_shipment(shipment.clone()).await?;
        db.commit().await?;
        metrics::counter!("shipments_created_total").increment(1);
        Ok(shipment)
    }

    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id, new_status = %cmd.new_status))]
    pub async fn update_status(&self, cmd: UpdateShipmentStatus) -> Result<Shipment, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut shipment = load(&db, cmd.shipment_id).await?;
        shipment.update_status(cmd.new_status, cmd.location, cmd.notes, &cmd.actor)?;

        db.update_shipment(shipment.clone()).await?;
        db.commit().await?;
        Ok(shipment)
    }

    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn add_tracking_update(
        &self,
        cmd: AddTrackingUpdate,
    ) -> Result<Shipment, DomainError> {
        ensure_valid(&cmd)?;

        let db = self.store.begin();
        let mut shipment = load(&db, cmd.shipment_id).await?;
        shipment.add_tracking_update(cmd.location, cmd.notes, &cmd.actor);

        db.update_shipment(shipment.clone()).await?;
        db.commit().await?;
        Ok(shipment)
    }

    #[tracing::instrument(skip(self, cmd), fields(shipment_id = %cmd.shipment_id))]
    pub async fn update_carrier_info(
        &self,
        cmd: UpdateCarrierInfo,
    ) -> Result<Shipment, DomainError> {
        ensure_valid(&cmd)?;

        let tracking_number = match &cmd.tracking_number {
            Some(value) => Some(TrackingNumber::new(value)?),
            None => None,
        };
        let db = self.store.begin();
        let mut shipment = load(&db, cmd.shipment_id).await?;
        shipment.update_carrier_info(cmd.carrier, tracking_number, &cmd.actor)?;

        db.update_shipment(shipment.clone()).await?;
        db.commit().await?;
        Ok(shipment)
    }

    /// Loads a shipment by id for the read side.
    pub async fn get_shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, DomainError> {
        Ok(self.store.begin().get_shipment_with_children(id).await?)
    }

    /// Returns all shipments for the read side.
    pub async fn list_shipments(&self) -> Result<Vec<Shipment>, DomainError> {
        Ok(self.store.begin().list_shipments().await?)
    }
}

async fn load(db: &impl ShipmentRepository, id: ShipmentId) -> Result<Shipment, DomainError> {
    db.get_shipment_with_children(id)
        .await?
        .ok_or(DomainError::ShipmentNotFound(id))
}
