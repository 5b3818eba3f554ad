//! Builds interaction records from gameplay events.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::clock::{Clock, seconds_between};
use crate::events::OutcomeEvent;
use crate::repository::{InteractionLogStore, InteractionRecord};

#[derive(Debug, Clone, Default)]
pub struct LoggerConfig {
    /// Mark every record as produced by an automated play-tester.
    pub simulated: bool,
}

/// Process-lifetime session identifier derived from the start instant.
pub fn new_session_id(clock: &dyn Clock) -> String {
    format!("session_{}", clock.now().timestamp_millis())
}

#[derive(Debug, Clone)]
struct PendingProblem {
    problem_id: String,
    shown_at: DateTime<Utc>,
    motor_deviation: f64,
}

/// Turns "problem shown" / "answer given" pairs into [`InteractionRecord`]s.
///
/// Each presentation is consumed by the first outcome that follows it; an
/// outcome with no pending presentation is ignored. Store failures are logged
/// and the record dropped so gameplay never waits on storage.
pub struct InteractionLogger {
    config: LoggerConfig,
    session_id: String,
    clock: Arc<dyn Clock>,
    store: Box<dyn InteractionLogStore>,
    pending: Option<PendingProblem>,
}

impl InteractionLogger {
    pub fn new(
        config: LoggerConfig,
        session_id: impl Into<String>,
        clock: Arc<dyn Clock>,
        store: Box<dyn InteractionLogStore>,
    ) -> Self {
        Self {
            config,
            session_id: session_id.into(),
            clock,
            store,
            pending: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Remember when a problem was presented.
    pub fn on_problem_shown(&mut self, problem_id: &str) {
        self.pending = Some(PendingProblem {
            problem_id: problem_id.to_string(),
            shown_at: self.clock.now(),
            motor_deviation: 0.0,
        });
    }

    /// Record a drag deviation sample for the current problem; the largest
    /// sample is kept.
    pub fn on_motor_sample(&mut self, deviation: f64) {
        if let Some(pending) = self.pending.as_mut() {
            pending.motor_deviation = pending.motor_deviation.max(deviation.abs());
        }
    }

    /// Build and append the record for the pending problem.
    ///
    /// Returns the record that was handed to the store, or `None` when there
    /// was no pending presentation or the append failed.
    pub fn on_outcome(&mut self, outcome: &OutcomeEvent) -> Option<InteractionRecord> {
        let pending = self.pending.take()?;

        let now = self.clock.now();
        let response_time_seconds = outcome.response_time_ms / 1000.0;
        let elapsed = seconds_between(pending.shown_at, now);

        let record = InteractionRecord {
            session_id: self.session_id.clone(),
            problem_id: Some(pending.problem_id),
            timestamp: now,
            is_correct: outcome.is_correct,
            response_time_seconds,
            hesitation_time_seconds: (elapsed - response_time_seconds).max(0.0),
            motor_deviation: pending.motor_deviation,
            simulated: self.config.simulated,
        };

        match self.store.append(&record) {
            Ok(()) => {
                debug!(
                    "Logged: Correct={}, Time={}ms, Hesitation={:.3}s",
                    record.is_correct, outcome.response_time_ms, record.hesitation_time_seconds
                );
                Some(record)
            }
            Err(e) => {
                warn!("Dropping interaction record, append failed: {}", e);
                None
            }
        }
    }

    /// Push buffered records to stable storage.
    pub fn flush(&mut self) {
        if let Err(e) = self.store.flush() {
            warn!("Failed to flush interaction log: {}", e);
        }
    }

    /// Every stored record, or an empty list if the store cannot be read.
    pub fn records(&mut self) -> Vec<InteractionRecord> {
        self.store.get_all().unwrap_or_else(|e| {
            warn!("Failed to read interaction log: {}", e);
            Vec::new()
        })
    }

    /// Delete every stored record.
    pub fn clear(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear interaction log: {}", e);
        }
    }
}
