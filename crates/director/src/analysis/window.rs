//! Fixed-capacity rolling window of answer samples.

use std::collections::VecDeque;

/// Window sizing and decision thresholds.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Number of most recent samples retained.
    pub capacity: usize,
    /// Average response time (ms) below which answers count as fluent.
    pub fluency_threshold_ms: f64,
    /// Samples required before any decision is made.
    pub min_samples: usize,
    /// Accuracy above which fluent play escalates.
    pub escalate_accuracy: f64,
    /// Accuracy below which play is scaffolded.
    pub scaffold_accuracy: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            fluency_threshold_ms: 2000.0,
            min_samples: 3,
            escalate_accuracy: 0.8,
            scaffold_accuracy: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    is_correct: bool,
    response_time_ms: f64,
}

/// Sliding window over the most recent outcomes.
///
/// Aggregates are maintained incrementally: eviction subtracts the oldest
/// sample before the new one is added, so `correct_count` and
/// `total_response_ms` always describe exactly the retained samples.
#[derive(Debug, Clone)]
pub struct PerformanceWindow {
    config: WindowConfig,
    samples: VecDeque<Sample>,
    correct_count: usize,
    total_response_ms: f64,
}

impl PerformanceWindow {
    pub fn new(config: WindowConfig) -> Self {
        let capacity = config.capacity.max(1);
        Self {
            config: WindowConfig { capacity, ..config },
            samples: VecDeque::with_capacity(capacity),
            correct_count: 0,
            total_response_ms: 0.0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(WindowConfig {
            capacity,
            ..WindowConfig::default()
        })
    }

    /// Insert a sample, evicting the oldest one when full.
    pub fn record_outcome(&mut self, is_correct: bool, response_time_ms: f64) {
        if self.samples.len() >= self.config.capacity
            && let Some(evicted) = self.samples.pop_front()
        {
            if evicted.is_correct {
                self.correct_count -= 1;
            }
            self.total_response_ms -= evicted.response_time_ms;
        }

        self.samples.push_back(Sample {
            is_correct,
            response_time_ms,
        });
        if is_correct {
            self.correct_count += 1;
        }
        self.total_response_ms += response_time_ms;
    }

    /// High accuracy at fluent speed.
    pub fn should_escalate(&self) -> bool {
        self.has_enough_samples()
            && self.accuracy() > self.config.escalate_accuracy
            && self.average_response_ms() < self.config.fluency_threshold_ms
    }

    /// Low accuracy regardless of speed.
    pub fn should_scaffold(&self) -> bool {
        self.has_enough_samples() && self.accuracy() < self.config.scaffold_accuracy
    }

    /// Fraction of retained samples that were correct (0 when empty).
    pub fn accuracy(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.correct_count as f64 / self.samples.len() as f64
    }

    /// Mean response time of retained samples (0 when empty).
    pub fn average_response_ms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.total_response_ms / self.samples.len() as f64
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.correct_count = 0;
        self.total_response_ms = 0.0;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn total_response_ms(&self) -> f64 {
        self.total_response_ms
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = (bool, f64)> + '_ {
        self.samples
            .iter()
            .map(|s| (s.is_correct, s.response_time_ms))
    }

    fn has_enough_samples(&self) -> bool {
        self.samples.len() >= self.config.min_samples
    }
}

impl Default for PerformanceWindow {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}
