//! Payment domain events.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::PaymentStatus;

/// Events recorded by the payment aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PaymentEvent {
    /// Payment was created.
    Created(PaymentCreatedData),

    /// Status changed.
    StatusChanged(PaymentStatusChangedData),
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Created(_) => "PaymentCreated",
            PaymentEvent::StatusChanged(_) => "PaymentStatusChanged",
        }
    }
}

/// Data for the PaymentCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreatedData {
    pub payment_id: PaymentId,
    pub order_id: OrderId,
    pub created_at: DateTime<Utc>,
}

/// Data for the PaymentStatusChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusChangedData {
    pub payment_id: PaymentId,
    pub old_status: PaymentStatus,
    pub new_status: PaymentStatus,
    pub changed_at: DateTime<Utc>,
}

impl PaymentEvent {
    /// Creates a PaymentCreated event.
    pub fn created(payment_id: PaymentId, order_id: OrderId) -> Self {
        PaymentEvent::Created(PaymentCreatedData {
            payment_id,
            order_id,
            created_at: Utc::now(),
        })
    }

    /// Creates a PaymentStatusChanged event.
    pub fn status_changed(
        payment_id: PaymentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
    ) -> Self {
        PaymentEvent::StatusChanged(PaymentStatusChangedData {
            payment_id,
            old_status,
            new_status,
            changed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types() {
        let payment_id = PaymentId::new();
        assert_eq!(
            PaymentEvent::created(payment_id, OrderId::new()).event_type(),
            "PaymentCreated"
        );
        assert_eq!(
            PaymentEvent::status_changed(
                payment_id,
                PaymentStatus::Pending,
                PaymentStatus::Successful
            )
            .event_type(),
            "PaymentStatusChanged"
        );
    }
}
