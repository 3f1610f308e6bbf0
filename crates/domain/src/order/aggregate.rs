//! Order aggregate implementation.

use common::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateRoot, Audit};
use crate::error::{DomainError, InvariantViolation};
use crate::product::Product;
use crate::values::{Address, Email, Money, OrderNumber, Sku};

use super::{OrderEvent, OrderStatus};

/// A line on an order.
///
/// Product name, SKU, and unit price are snapshots captured at placement
/// time; later changes to the product never alter them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    product_id: ProductId,
    product_name: String,
    product_sku: Sku,
    quantity: u32,
    unit_price: Money,
}

impl OrderDetail {
    fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id(),
            product_name: product.name().to_string(),
            product_sku: product.sku().clone(),
            quantity,
            unit_price: product.price().clone(),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn product_sku(&self) -> &Sku {
        &self.product_sku
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> &Money {
        &self.unit_price
    }

    /// Returns the derived line total (unit price times quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// The total is derived: it is recomputed from the detail lines on every
/// structural change and always equals the sum of line totals. Structural
/// mutation is rejected once the order reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: OrderNumber,
    customer_name: String,
    customer_email: Email,
    shipping_address: Address,
    status: OrderStatus,
    total_amount: Money,
    notes: Option<String>,
    details: Vec<OrderDetail>,
    audit: Audit,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn customer_email(&self) -> &Email {
        &self.customer_email
    }

    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn total_amount(&self) -> &Money {
        &self.total_amount
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn details(&self) -> &[OrderDetail] {
        &self.details
    }

    pub fn detail_for(&self, product_id: ProductId) -> Option<&OrderDetail> {
        self.details.iter().find(|d| d.product_id == product_id)
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Behavior methods
impl Order {
    /// Creates a new pending order with no details and a zero total.
    pub fn place(
        id: OrderId,
        order_number: OrderNumber,
        customer_name: impl Into<String>,
        customer_email: Email,
        shipping_address: Address,
        notes: Option<String>,
        actor: &str,
    ) -> Self {
        let mut order = Self {
            id,
            order_number: order_number.clone(),
            customer_name: customer_name.into(),
            customer_email: customer_email.clone(),
            shipping_address,
            status: OrderStatus::Pending,
            total_amount: Money::zero_usd(),
            notes,
            details: Vec::new(),
            audit: Audit::new(actor),
            events: Vec::new(),
        };
        order.record(OrderEvent::placed(
            id,
            order_number.as_str(),
            customer_email.as_str(),
        ));
        order
    }

    /// Adds a line for the product, snapshotting name, SKU, and unit price.
    ///
    /// A line for a product already on the order merges into the existing
    /// detail by summing quantities; the original snapshot is kept.
    pub fn add_detail(
        &mut self,
        product: &Product,
        quantity: u32,
        actor: &str,
    ) -> Result<(), DomainError> {
        self.ensure_mutable("add detail")?;
        if quantity == 0 {
            return Err(InvariantViolation::ZeroQuantity.into());
        }

        if let Some(existing) = self
            .details
            .iter_mut()
            .find(|d| d.product_id == product.id())
        {
            existing.quantity += quantity;
        } else {
            self.details
                .push(OrderDetail::from_product(product, quantity));
        }

        self.recompute_total()?;
        self.audit.touch(actor);
        self.record(OrderEvent::detail_added(self.id, product.id(), quantity));
        Ok(())
    }

    /// Removes the line for the product.
    pub fn remove_detail(&mut self, product_id: ProductId, actor: &str) -> Result<(), DomainError> {
        self.ensure_mutable("remove detail")?;

        let before = self.details.len();
        self.details.retain(|d| d.product_id != product_id);
        if self.details.len() == before {
            return Err(DomainError::OrderDetailNotFound(product_id));
        }

        self.recompute_total()?;
        self.audit.touch(actor);
        self.record(OrderEvent::detail_removed(self.id, product_id));
        Ok(())
    }

    /// Updates customer name and email.
    pub fn update_customer_info(
        &mut self,
        customer_name: impl Into<String>,
        customer_email: Email,
        actor: &str,
    ) -> Result<(), DomainError> {
        self.ensure_mutable("update customer info")?;
        self.customer_name = customer_name.into();
        self.customer_email = customer_email;
        self.audit.touch(actor);
        self.record(OrderEvent::updated(self.id));
        Ok(())
    }

    /// Updates the shipping address.
    pub fn update_shipping_address(
        &mut self,
        shipping_address: Address,
        actor: &str,
    ) -> Result<(), DomainError> {
        self.ensure_mutable("update shipping address")?;
        self.shipping_address = shipping_address;
        self.audit.touch(actor);
        self.record(OrderEvent::updated(self.id));
        Ok(())
    }

    /// Replaces the free-form notes.
    pub fn update_notes(&mut self, notes: Option<String>, actor: &str) -> Result<(), DomainError> {
        self.ensure_mutable("update notes")?;
        self.notes = notes;
        self.audit.touch(actor);
        Ok(())
    }

    /// Moves the order to a new status along the transition table.
    pub fn update_status(
        &mut self,
        new_status: OrderStatus,
        actor: &str,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidTransition {
                entity: "order",
                from: self.status.as_str(),
                to: new_status.as_str(),
            });
        }
        let old = self.status;
        self.status = new_status;
        self.audit.touch(actor);
        self.record(OrderEvent::status_changed(self.id, old, new_status));
        Ok(())
    }

    /// Cancels the order from any non-terminal status.
    pub fn cancel(&mut self, reason: impl Into<String>, actor: &str) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                entity: "order",
                from: self.status.as_str(),
                to: OrderStatus::Cancelled.as_str(),
            });
        }
        let old = self.status;
        self.status = OrderStatus::Cancelled;
        self.audit.touch(actor);
        self.record(OrderEvent::cancelled(self.id, reason, actor));
        self.record(OrderEvent::status_changed(self.id, old, OrderStatus::Cancelled));
        Ok(())
    }

    fn ensure_mutable(&self, action: &'static str) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::ActionNotAllowed {
                entity: "order",
                status: self.status.as_str(),
                action,
            });
        }
        Ok(())
    }

    fn recompute_total(&mut self) -> Result<(), InvariantViolation> {
        let mut total = match self.details.first() {
            Some(first) => first.unit_price.zero_like(),
            None => self.total_amount.zero_like(),
        };
        for detail in &self.details {
            total = total.add(&detail.line_total())?;
        }
        self.total_amount = total;
        Ok(())
    }

    fn record(&mut self, event: OrderEvent) {
        self.events.push(event);
    }
}
