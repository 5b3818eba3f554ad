//! Learner performance analysis.
//!
//! - [`PerformanceWindow`] keeps rolling accuracy and latency over the last
//!   few answers
//! - [`ProgressionAnalyzer`] turns window verdicts into interventions
//! - [`MasteryRegulator`] maintains the long-running mastery score

mod mastery;
mod progression;
mod window;

pub use mastery::{MasteryConfig, MasteryRegulator, MasteryUpdate};
pub use progression::ProgressionAnalyzer;
pub use window::{PerformanceWindow, WindowConfig};
