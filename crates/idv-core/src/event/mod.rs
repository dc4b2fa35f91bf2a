//! Journal append-only de transiciones del coordinador.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{FlowEvent, FlowEventKind, SkipReason};
