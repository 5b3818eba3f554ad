//! Deferred persistence of learner state.

mod cache;

pub use cache::{FlushState, PersistenceCache};
