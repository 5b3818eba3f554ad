//! Write-behind cache over a [`SnapshotRepository`].
//!
//! # Flush cycle
//!
//! ```text
//! Clean ──save()──▶ Dirty + FlushScheduled ──end of frame──▶ Clean
//!                                          └─shutdown()────▶ Clean
//! ```
//!
//! Any number of `save` calls within one frame collapse into a single write of
//! the latest snapshot. A failed write leaves the snapshot dirty; the next
//! `save` schedules another attempt and `shutdown` always writes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::repository::SnapshotRepository;
use crate::scheduler::FrameScheduler;

/// Observable state of the dirty/flush cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    /// In-memory snapshot matches the last durable write.
    Clean,
    /// Snapshot changed and a flush is queued for the end of the frame.
    DirtyFlushScheduled,
    /// Snapshot changed but the last write failed and nothing is queued.
    Dirty,
}

struct CacheState<T> {
    snapshot: Option<T>,
    dirty: bool,
    flush_scheduled: bool,
}

/// In-memory snapshot with end-of-frame batched writes.
///
/// Cloning yields another handle to the same snapshot. Storage failures never
/// surface to callers: they are logged and the cache keeps serving the
/// in-memory value (or `T::default()` if nothing could be loaded).
pub struct PersistenceCache<T> {
    state: Arc<Mutex<CacheState<T>>>,
    repository: Arc<dyn SnapshotRepository<T>>,
    scheduler: FrameScheduler,
}

impl<T> PersistenceCache<T>
where
    T: Clone + Default + Send + 'static,
{
    pub fn new(repository: Arc<dyn SnapshotRepository<T>>, scheduler: FrameScheduler) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState {
                snapshot: None,
                dirty: false,
                flush_scheduled: false,
            })),
            repository,
            scheduler,
        }
    }

    /// Current snapshot.
    ///
    /// Only the first call touches the repository; later calls are served
    /// from memory.
    pub fn load(&self) -> T {
        let mut state = self.lock();
        if let Some(snapshot) = &state.snapshot {
            return snapshot.clone();
        }

        let loaded = match self.repository.load() {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("No persisted snapshot, starting from defaults");
                T::default()
            }
            Err(e) => {
                error!("Failed to load persisted snapshot, using defaults: {}", e);
                T::default()
            }
        };

        state.snapshot = Some(loaded.clone());
        loaded
    }

    /// Replace the snapshot and schedule one end-of-frame flush.
    pub fn save(&self, data: T) {
        let mut state = self.lock();
        state.snapshot = Some(data);
        state.dirty = true;

        if !state.flush_scheduled {
            state.flush_scheduled = true;
            let cache = self.clone();
            self.scheduler
                .schedule_end_of_frame(move || cache.flush_scheduled());
        }
    }

    /// Load, modify and save in one step.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> T {
        let mut data = self.load();
        f(&mut data);
        self.save(data.clone());
        data
    }

    /// Synchronous termination flush.
    ///
    /// Writes the cached snapshot whether or not a frame flush is pending, so
    /// the last batch is not lost when the process exits before the frame
    /// ends. Does nothing if the snapshot was never loaded or saved.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        let Some(snapshot) = &state.snapshot else {
            return;
        };

        match self.repository.save(snapshot) {
            Ok(()) => {
                state.dirty = false;
                debug!("Termination flush complete");
            }
            Err(e) => error!("Emergency save failed: {}", e),
        }
    }

    pub fn flush_state(&self) -> FlushState {
        let state = self.lock();
        match (state.dirty, state.flush_scheduled) {
            (_, true) => FlushState::DirtyFlushScheduled,
            (true, false) => FlushState::Dirty,
            (false, false) => FlushState::Clean,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn flush_scheduled(&self) {
        let mut state = self.lock();
        state.flush_scheduled = false;

        if !state.dirty {
            return;
        }
        let Some(snapshot) = &state.snapshot else {
            return;
        };

        match self.repository.save(snapshot) {
            Ok(()) => {
                state.dirty = false;
                debug!("Flushed persisted snapshot");
            }
            Err(e) => warn!("Save failed, keeping snapshot dirty: {}", e),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Clone for PersistenceCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            repository: Arc::clone(&self.repository),
            scheduler: self.scheduler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemorySnapshotRepository, RepositoryError, Result};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter {
        value: u32,
    }

    fn cache_over(
        repo: Arc<InMemorySnapshotRepository<Counter>>,
    ) -> (PersistenceCache<Counter>, FrameScheduler) {
        let scheduler = FrameScheduler::new();
        let cache = PersistenceCache::new(repo, scheduler.clone());
        (cache, scheduler)
    }

    /// Repository whose writes fail until `healthy` is set.
    #[derive(Default)]
    struct FlakyRepository {
        healthy: AtomicBool,
        inner: InMemorySnapshotRepository<Counter>,
    }

    impl SnapshotRepository<Counter> for FlakyRepository {
        fn load(&self) -> Result<Option<Counter>> {
            Err(RepositoryError::CorruptedData("unreadable".into()))
        }

        fn save(&self, value: &Counter) -> Result<()> {
            if self.healthy.load(Ordering::SeqCst) {
                self.inner.save(value)
            } else {
                Err(RepositoryError::Io(std::io::Error::other("disk full")))
            }
        }
    }

    #[test]
    fn test_saves_within_a_frame_collapse_into_one_write() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let (cache, scheduler) = cache_over(Arc::clone(&repo));

        for value in 1..=3 {
            cache.save(Counter { value });
        }
        assert_eq!(repo.write_count(), 0);
        assert_eq!(cache.flush_state(), FlushState::DirtyFlushScheduled);
        assert_eq!(scheduler.pending(), 1);

        scheduler.run_end_of_frame();

        assert_eq!(repo.write_count(), 1);
        assert_eq!(repo.load().unwrap(), Some(Counter { value: 3 }));
        assert_eq!(cache.flush_state(), FlushState::Clean);
    }

    #[test]
    fn test_load_reads_repository_once() {
        let repo = Arc::new(InMemorySnapshotRepository::with_value(Counter { value: 9 }));
        let (cache, _scheduler) = cache_over(Arc::clone(&repo));

        assert_eq!(cache.load(), Counter { value: 9 });

        // Changing the backing store is invisible once cached
        repo.save(&Counter { value: 1 }).unwrap();
        assert_eq!(cache.load(), Counter { value: 9 });
    }

    #[test]
    fn test_load_returns_latest_save_before_flush() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let (cache, _scheduler) = cache_over(repo);

        cache.save(Counter { value: 4 });
        assert_eq!(cache.load(), Counter { value: 4 });
    }

    #[test]
    fn test_each_frame_gets_its_own_flush() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let (cache, scheduler) = cache_over(Arc::clone(&repo));

        cache.save(Counter { value: 1 });
        scheduler.run_end_of_frame();
        cache.update(|c| c.value += 1);
        scheduler.run_end_of_frame();
        scheduler.run_end_of_frame();

        assert_eq!(repo.write_count(), 2);
        assert_eq!(repo.load().unwrap(), Some(Counter { value: 2 }));
    }

    #[test]
    fn test_shutdown_writes_pending_snapshot() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let (cache, scheduler) = cache_over(Arc::clone(&repo));

        cache.save(Counter { value: 5 });
        cache.shutdown();

        assert_eq!(repo.write_count(), 1);
        assert_eq!(repo.load().unwrap(), Some(Counter { value: 5 }));

        // The queued frame flush finds nothing left to write
        scheduler.run_end_of_frame();
        assert_eq!(repo.write_count(), 1);
    }

    #[test]
    fn test_shutdown_without_snapshot_is_noop() {
        let repo = Arc::new(InMemorySnapshotRepository::new());
        let (cache, _scheduler) = cache_over(Arc::clone(&repo));
        cache.shutdown();
        assert_eq!(repo.write_count(), 0);
    }

    #[test]
    fn test_storage_failures_degrade_to_memory() {
        let repo = Arc::new(FlakyRepository::default());
        let scheduler = FrameScheduler::new();
        let cache: PersistenceCache<Counter> =
            PersistenceCache::new(Arc::clone(&repo) as _, scheduler.clone());

        assert_eq!(cache.load(), Counter::default());

        cache.save(Counter { value: 2 });
        scheduler.run_end_of_frame();
        assert_eq!(cache.flush_state(), FlushState::Dirty);
        assert_eq!(cache.load(), Counter { value: 2 });

        repo.healthy.store(true, Ordering::SeqCst);
        cache.save(Counter { value: 3 });
        scheduler.run_end_of_frame();

        assert_eq!(cache.flush_state(), FlushState::Clean);
        assert_eq!(repo.inner.write_count(), 1);
    }
}
