use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::repository::traits::SnapshotRepository;
use crate::repository::{RepositoryError, Result};

/// In-memory implementation of SnapshotRepository
///
/// Counts physical writes so callers can verify write batching.
pub struct InMemorySnapshotRepository<T> {
    value: RwLock<Option<T>>,
    writes: AtomicUsize,
}

impl<T> InMemorySnapshotRepository<T> {
    pub fn new() -> Self {
        Self {
            value: RwLock::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn with_value(value: T) -> Self {
        Self {
            value: RwLock::new(Some(value)),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of successful `save` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<T> Default for InMemorySnapshotRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotRepository<T> for InMemorySnapshotRepository<T>
where
    T: Clone + Send + Sync,
{
    fn load(&self) -> Result<Option<T>> {
        let value = self
            .value
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(value.clone())
    }

    fn save(&self, value: &T) -> Result<()> {
        let mut current = self
            .value
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *current = Some(value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
