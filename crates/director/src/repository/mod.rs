//! Repository layer for telemetry and learner state
//!
//! - [`InteractionLogStore`] implementations keep the per-answer interaction log
//! - [`SnapshotRepository`] implementations keep the aggregate learner statistics
//!
//! File-backed implementations are used in production; in-memory ones back
//! tests and serve as the fallback when storage is unavailable.

mod error;
mod file;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use file::{FileSnapshotRepository, JsonLinesLogStore, SnapshotLogStore};
pub use memory::{InMemoryLogStore, InMemorySnapshotRepository};
pub use traits::{InteractionLogStore, SnapshotRepository};
pub use types::InteractionRecord;
