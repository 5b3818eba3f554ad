//! Persisted aggregate statistics.

use serde::{Deserialize, Serialize};

/// Learner-facing comfort settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityFlags {
    /// Reduced stimulation: music muted, particles off.
    pub zen_mode: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

/// Totals across every session on this installation.
///
/// Written as one JSON document; fields missing from older files take their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateUserStats {
    pub total_sessions: u32,
    pub total_minutes: f64,
    /// Percentage in `0..=100`, weighted by problems answered.
    pub overall_accuracy: f64,
    pub total_problems_answered: u32,
    pub accessibility: AccessibilityFlags,
}

/// Outcome of one finished session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub duration_minutes: f64,
    pub problems_attempted: u32,
    pub problems_correct: u32,
}

impl SessionSummary {
    /// Session accuracy as a percentage, or `None` when nothing was attempted.
    pub fn accuracy(&self) -> Option<f64> {
        (self.problems_attempted > 0)
            .then(|| self.problems_correct as f64 * 100.0 / self.problems_attempted as f64)
    }
}

impl AggregateUserStats {
    /// Fold a finished session into the totals.
    ///
    /// Accuracy only moves when the session attempted at least one problem.
    pub fn record_session(&mut self, summary: &SessionSummary) {
        self.total_sessions += 1;
        self.total_minutes += summary.duration_minutes.max(0.0);

        if let Some(session_accuracy) = summary.accuracy() {
            self.overall_accuracy = weighted_accuracy(
                self.overall_accuracy,
                self.total_problems_answered,
                session_accuracy,
                summary.problems_attempted,
            );
            self.total_problems_answered += summary.problems_attempted;
        }
    }
}

/// Running weighted average of two accuracy percentages.
///
/// `(prev * prev_count + session * session_count) / (prev_count + session_count)`;
/// returns `prev` unchanged when both counts are zero.
pub fn weighted_accuracy(prev: f64, prev_count: u32, session: f64, session_count: u32) -> f64 {
    let total = prev_count as f64 + session_count as f64;
    if total == 0.0 {
        return prev;
    }
    (prev * prev_count as f64 + session * session_count as f64) / total
}
