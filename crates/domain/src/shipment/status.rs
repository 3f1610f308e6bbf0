//! Shipment status state machine.

use serde::{Deserialize, Serialize};

/// The status of a shipment in its delivery lifecycle.
///
/// Transitions:
/// ```text
/// Pending ──► Shipped ──► InTransit ──► OutForDelivery ──► Delivered
///                │  ▲         │  ▲            │
///                │  │         │  │            ├──► FailedDelivery ──► Returned
///                │  │         │  │            │          │
///                └──┴────►  Delayed  ◄────────┘          └──► InTransit
/// ```
///
/// Delivered and Returned are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShipmentStatus {
    #[default]
    Pending,
    Shipped,
    InTransit,
    OutForDelivery,
    Delayed,
    FailedDelivery,
    Delivered,
    Returned,
}

impl ShipmentStatus {
    /// Returns true if the move to `target` is in the transition table.
    pub fn can_transition_to(&self, target: ShipmentStatus) -> bool {
        use ShipmentStatus::*;
        matches!(
            (self, target),
            (Pending, Shipped)
                | (Shipped, InTransit | Delayed | FailedDelivery)
                | (InTransit, OutForDelivery | Delayed | FailedDelivery)
                | (OutForDelivery, Delivered | FailedDelivery | Delayed)
                | (Delayed, InTransit | OutForDelivery | FailedDelivery)
                | (FailedDelivery, Returned | InTransit)
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered | ShipmentStatus::Returned)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Shipped => "Shipped",
            ShipmentStatus::InTransit => "InTransit",
            ShipmentStatus::OutForDelivery => "OutForDelivery",
            ShipmentStatus::Delayed => "Delayed",
            ShipmentStatus::FailedDelivery => "FailedDelivery",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
