//! Shipment aggregate.

mod aggregate;
mod events;
mod status;

pub use aggregate::{Shipment, ShipmentItem, TrackingDetail};
pub use events::{
    ShipmentCreatedData, ShipmentEvent, ShipmentStatusChangedData, ShipmentTrackingAddedData,
};
pub use status::ShipmentStatus;
