//! Learner session bookkeeping and persisted learner state.

mod accessibility;
mod stats;
mod tracker;

pub use accessibility::AccessibilitySettings;
pub use stats::{AccessibilityFlags, AggregateUserStats, SessionSummary, weighted_accuracy};
pub use tracker::{SessionConfig, SessionTracker};
