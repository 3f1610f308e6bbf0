//! In-memory persistence collaborator for the commerce core.
//!
//! [`InMemoryStore`] opens request-scoped [`InMemorySession`] units of work
//! implementing every repository contract. Writes are staged per session
//! and become visible only when [`commit`](domain::UnitOfWork::commit)
//! applies them — all or nothing, the same durability shape a relational
//! implementation provides with a transaction.

mod memory;

pub use memory::{InMemorySession, InMemoryStore};
