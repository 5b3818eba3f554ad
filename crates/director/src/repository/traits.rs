//! Repository contracts for telemetry and persisted learner state.

use super::Result;
use super::types::InteractionRecord;

/// Durable storage for interaction records.
///
/// Records come back from [`get_all`](Self::get_all) in the order they were
/// appended, including across a reopen of the backing storage.
pub trait InteractionLogStore: Send {
    /// Append one record.
    ///
    /// Must not re-read or rewrite the existing history in production
    /// implementations.
    fn append(&mut self, record: &InteractionRecord) -> Result<()>;

    /// Every record ever appended, oldest first.
    fn get_all(&mut self) -> Result<Vec<InteractionRecord>>;

    /// Delete all records.
    fn clear(&mut self) -> Result<()>;

    /// Push buffered writes to stable storage.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Whole-object storage for a single persisted snapshot.
pub trait SnapshotRepository<T>: Send + Sync {
    /// Load the stored snapshot, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<T>>;

    /// Replace the stored snapshot.
    fn save(&self, value: &T) -> Result<()>;
}
