//! Payment aggregate implementation.

use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::aggregate::{AggregateRoot, Audit};
use crate::error::DomainError;
use crate::values::Money;

use super::{PaymentEvent, PaymentStatus};

/// Payment aggregate root.
///
/// A payment settles exactly one order; the dependency is one-way and
/// checked by the create handler, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    id: PaymentId,
    order_id: OrderId,
    status: PaymentStatus,
    amount: Money,
    payment_method: Option<String>,
    transaction_id: Option<String>,
    audit: Audit,
    #[serde(skip)]
    events: Vec<PaymentEvent>,
}

impl AggregateRoot for Payment {
    type Event = PaymentEvent;

    fn events(&self) -> &[PaymentEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<PaymentEvent> {
        std::mem::take(&mut self.events)
    }
}

// Query methods
impl Payment {
    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn audit(&self) -> &Audit {
        &self.audit
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Behavior methods
impl Payment {
    /// Creates a new pending payment against an order.
    pub fn create(
        id: PaymentId,
        order_id: OrderId,
        amount: Money,
        payment_method: Option<String>,
        actor: &str,
    ) -> Self {
        let mut payment = Self {
            id,
            order_id,
            status: PaymentStatus::Pending,
            amount,
            payment_method,
            transaction_id: None,
            audit: Audit::new(actor),
            events: Vec::new(),
        };
        payment.record(PaymentEvent::created(id, order_id));
        payment
    }

    /// Moves the payment to a new status.
    ///
    /// A transition to the current status and a transition out of a
    /// terminal status are rejected with distinct errors. A transition
    /// landing in Successful records the transaction id when one is given.
    pub fn update_status(
        &mut self,
        new_status: PaymentStatus,
        transaction_id: Option<String>,
        actor: &str,
    ) -> Result<(), DomainError> {
        if new_status == self.status {
            return Err(DomainError::AlreadyInStatus(self.status.as_str()));
        }
        if self.status.is_terminal() {
            return Err(DomainError::TerminalStatus {
                entity: "payment",
                status: self.status.as_str(),
            });
        }

        let old = self.status;
        self.status = new_status;
        if new_status == PaymentStatus::Successful
            && let Some(tx) = transaction_id
        {
            self.transaction_id = Some(tx);
        }
        self.audit.touch(actor);
        self.record(PaymentEvent::status_changed(self.id, old, new_status));
        Ok(())
    }

    fn record(&mut self, event: PaymentEvent) {
        self.events.push(event);
    }
}
