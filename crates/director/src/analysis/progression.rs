//! Window-driven difficulty decisions.

use tracing::info;

use super::window::{PerformanceWindow, WindowConfig};
use crate::events::{InterventionType, OutcomeEvent};

/// Owns the session's [`PerformanceWindow`] and turns its verdicts into
/// interventions.
///
/// The window only reports; this analyzer is the consumer that resets it once
/// it has acted, so samples are never dropped without an intervention.
#[derive(Debug, Clone, Default)]
pub struct ProgressionAnalyzer {
    window: PerformanceWindow,
}

impl ProgressionAnalyzer {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            window: PerformanceWindow::new(config),
        }
    }

    /// Record an outcome and decide whether to intervene.
    ///
    /// Escalation is checked before scaffolding.
    pub fn on_outcome(&mut self, outcome: &OutcomeEvent) -> Option<InterventionType> {
        self.window
            .record_outcome(outcome.is_correct, outcome.response_time_ms);

        let intervention = if self.window.should_escalate() {
            info!(
                accuracy = self.window.accuracy(),
                avg_ms = self.window.average_response_ms(),
                "Mastery detected, leveling up"
            );
            InterventionType::LevelUp
        } else if self.window.should_scaffold() {
            info!(
                accuracy = self.window.accuracy(),
                "Struggle detected, showing demonstration"
            );
            InterventionType::ShowDemo
        } else {
            return None;
        };

        self.window.reset();
        Some(intervention)
    }

    pub fn window(&self) -> &PerformanceWindow {
        &self.window
    }
}
