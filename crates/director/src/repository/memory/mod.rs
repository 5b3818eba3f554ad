//! In-memory repository implementations for testing and ephemeral fallback.

mod log;
mod snapshot;

pub use log::InMemoryLogStore;
pub use snapshot::InMemorySnapshotRepository;
