//! Payment status state machine.

use serde::{Deserialize, Serialize};

/// The status of a payment.
///
/// Pending moves to Successful or Failed; both are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Successful,
    Failed,
}

impl PaymentStatus {
    /// Returns true if the move to `target` is in the transition table.
    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        matches!(
            (self, target),
            (
                PaymentStatus::Pending,
                PaymentStatus::Successful | PaymentStatus::Failed
            )
        )
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Successful | PaymentStatus::Failed)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Successful => "Successful",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    const ALL: [PaymentStatus; 3] = [Pending, Successful, Failed];

    #[test]
    fn pending_reaches_both_terminals() {
        assert!(Pending.can_transition_to(Successful));
        assert!(Pending.can_transition_to(Failed));
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in ALL {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn terminal_statuses_have_no_outgoing_transitions() {
        for from in [Successful, Failed] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to));
            }
        }
    }
}
