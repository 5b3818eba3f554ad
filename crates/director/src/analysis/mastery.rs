//! Clamped mastery ("garden growth") scalar.

use crate::events::InterventionType;

/// Growth rates and intervention thresholds for [`MasteryRegulator`].
#[derive(Debug, Clone)]
pub struct MasteryConfig {
    /// Starting score.
    pub base_value: f64,
    /// Added on every correct answer.
    pub increment: f64,
    /// Extra increment for answers faster than `fast_threshold_ms`.
    pub fast_bonus: f64,
    pub fast_threshold_ms: f64,
    /// Subtracted on every incorrect answer.
    pub decrement: f64,
    /// Scores strictly above this request a level up.
    pub high_threshold: f64,
    /// Scores strictly below this request scaffolding.
    pub low_threshold: f64,
    /// Outcomes after a threshold intervention during which no further
    /// threshold intervention fires. Zero disables the cooldown.
    pub cooldown_outcomes: u32,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            base_value: 0.4,
            increment: 0.05,
            fast_bonus: 0.02,
            fast_threshold_ms: 2000.0,
            decrement: 0.1,
            high_threshold: 0.85,
            low_threshold: 0.25,
            cooldown_outcomes: 0,
        }
    }
}

/// Result of one [`MasteryRegulator::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasteryUpdate {
    pub score: f64,
    pub intervention: Option<InterventionType>,
}

/// Asymmetric increment/decrement controller over a score in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct MasteryRegulator {
    config: MasteryConfig,
    score: f64,
    cooldown_remaining: u32,
}

impl MasteryRegulator {
    pub fn new(config: MasteryConfig) -> Self {
        let score = clamp01(config.base_value);
        Self {
            config,
            score,
            cooldown_remaining: 0,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn config(&self) -> &MasteryConfig {
        &self.config
    }

    pub fn update(&mut self, is_correct: bool, response_time_ms: f64) -> MasteryUpdate {
        self.score = if is_correct {
            let bonus = if response_time_ms < self.config.fast_threshold_ms {
                self.config.fast_bonus
            } else {
                0.0
            };
            clamp01(self.score + self.config.increment + bonus)
        } else {
            clamp01(self.score - self.config.decrement)
        };

        let intervention = if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
            None
        } else {
            self.threshold_intervention()
        };

        if intervention.is_some() {
            self.cooldown_remaining = self.config.cooldown_outcomes;
        }

        MasteryUpdate {
            score: self.score,
            intervention,
        }
    }

    fn threshold_intervention(&self) -> Option<InterventionType> {
        if self.score > self.config.high_threshold {
            Some(InterventionType::LevelUp)
        } else if self.score < self.config.low_threshold {
            Some(InterventionType::ScaffoldDown)
        } else {
            None
        }
    }
}

impl Default for MasteryRegulator {
    fn default() -> Self {
        Self::new(MasteryConfig::default())
    }
}

fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
