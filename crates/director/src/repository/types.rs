//! Persisted telemetry records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One answered problem, as written to the interaction log.
///
/// Records are immutable once built; stores only ever append them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    /// Stable for the lifetime of the process.
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub is_correct: bool,
    pub response_time_seconds: f64,
    /// Time between presentation and the start of the answer; never negative.
    pub hesitation_time_seconds: f64,
    /// Largest drag deviation observed while answering (motor control proxy).
    #[serde(default)]
    pub motor_deviation: f64,
    /// Produced by an automated play-tester rather than a learner.
    #[serde(default)]
    pub simulated: bool,
}
