//! Core aggregate and domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;
}

/// Capability trait for aggregate roots that record domain events.
///
/// An aggregate records events internally as its behavior methods run.
/// The buffer is append-only from the aggregate's point of view; callers
/// read it through [`events`](AggregateRoot::events) and drain it with
/// [`take_events`](AggregateRoot::take_events) once the events have been
/// dispatched. The buffer is never exposed mutably.
pub trait AggregateRoot {
    /// The type of events this aggregate records.
    type Event: DomainEvent;

    /// Returns an immutable view of the events recorded since the last drain.
    fn events(&self) -> &[Self::Event];

    /// Drains the recorded events, leaving the buffer empty.
    fn take_events(&mut self) -> Vec<Self::Event>;
}

/// Creation and modification stamps carried by every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    created_at: DateTime<Utc>,
    created_by: String,
    updated_at: Option<DateTime<Utc>>,
    modified_by: Option<String>,
}

impl Audit {
    /// Creates a fresh stamp for a newly constructed aggregate.
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            created_at: Utc::now(),
            created_by: actor.into(),
            updated_at: None,
            modified_by: None,
        }
    }

    /// Records a modification by the given actor.
    pub fn touch(&mut self, actor: &str) {
        self.updated_at = Some(Utc::now());
        self.modified_by = Some(actor.to_string());
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn modified_by(&self) -> Option<&str> {
        self.modified_by.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_audit_has_no_modification() {
        let audit = Audit::new("alice");
        assert_eq!(audit.created_by(), "alice");
        assert!(audit.updated_at().is_none());
        assert!(audit.modified_by().is_none());
    }

    #[test]
    fn touch_records_actor_and_time() {
        let mut audit = Audit::new("alice");
        audit.touch("bob");
        assert_eq!(audit.modified_by(), Some("bob"));
        assert!(audit.updated_at().is_some());
        assert!(audit.updated_at().unwrap() >= audit.created_at());
    }
}
