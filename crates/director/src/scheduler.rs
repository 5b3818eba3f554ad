//! End-of-frame task queue.
//!
//! Stands in for the host engine's "wait for end of frame": work that must not
//! run inside event dispatch (disk writes) is queued here and executed once the
//! current tick's gameplay and event handling are done.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

type Task = Box<dyn FnOnce() + Send>;

/// Cloneable handle to a shared queue of one-shot end-of-frame tasks.
#[derive(Clone, Default)]
pub struct FrameScheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task to run at the end of the current frame.
    pub fn schedule_end_of_frame(&self, task: impl FnOnce() + Send + 'static) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Box::new(task));
    }

    /// Run every task queued so far, in queue order.
    ///
    /// Tasks scheduled while this runs are left for the next frame. Returns the
    /// number of tasks executed.
    pub fn run_end_of_frame(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner));
        let count = tasks.len();

        for task in tasks {
            task();
        }

        if count > 0 {
            trace!(count, "Ran end-of-frame tasks");
        }
        count
    }

    /// Number of tasks waiting for the end of the frame.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
