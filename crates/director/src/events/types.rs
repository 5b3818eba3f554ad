//! Event payload types shared by gameplay, presentation, and telemetry.

use serde::{Deserialize, Serialize};

/// High-level screen state of the host game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    MainMenu,
    Instruction,
    Gameplay,
    Feedback,
    Paused,
}

/// Change in difficulty or instructional support requested by an analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterventionType {
    /// Learner is fluent: raise the difficulty.
    LevelUp,
    /// Learner is struggling: lower the difficulty.
    ScaffoldDown,
    /// Learner is struggling: replay the worked demonstration.
    ShowDemo,
}

/// Voice used by the on-screen guide character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuidePersonality {
    WiseOwl,
    KindBunny,
    CuriousCat,
}

/// A single answered problem as reported by gameplay.
///
/// Ephemeral: consumed synchronously by subscribers and never stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeEvent {
    pub is_correct: bool,
    pub response_time_ms: f64,
}

impl OutcomeEvent {
    pub const fn new(is_correct: bool, response_time_ms: f64) -> Self {
        Self {
            is_correct,
            response_time_ms,
        }
    }

    pub const fn correct(response_time_ms: f64) -> Self {
        Self::new(true, response_time_ms)
    }

    pub const fn incorrect(response_time_ms: f64) -> Self {
        Self::new(false, response_time_ms)
    }
}

/// Guide dialogue line routed to the speech and subtitle layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideLine {
    pub personality: GuidePersonality,
    pub message: String,
}
