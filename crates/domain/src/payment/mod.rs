//! Payment aggregate.

mod aggregate;
mod events;
mod status;

pub use aggregate::Payment;
pub use events::{PaymentCreatedData, PaymentEvent, PaymentStatusChangedData};
pub use status::PaymentStatus;
