//! Session boundaries and per-session counters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use super::stats::{AggregateUserStats, SessionSummary};
use crate::clock::{Clock, seconds_between};
use crate::events::{GameState, OutcomeEvent};
use crate::persistence::PersistenceCache;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inactivity after which the running session is closed.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Tracks the current play session and folds it into the persisted totals
/// when it ends.
///
/// A session ends when the learner returns to the main menu after answering
/// at least one problem, when the host is backgrounded, on inactivity timeout,
/// or on shutdown.
pub struct SessionTracker {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    stats: PersistenceCache<AggregateUserStats>,
    started_at: DateTime<Utc>,
    last_interaction: DateTime<Utc>,
    problems_attempted: u32,
    problems_correct: u32,
    active: bool,
}

impl SessionTracker {
    /// Create a tracker with a session already running.
    pub fn new(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        stats: PersistenceCache<AggregateUserStats>,
    ) -> Self {
        let now = clock.now();
        let mut tracker = Self {
            config,
            clock,
            stats,
            started_at: now,
            last_interaction: now,
            problems_attempted: 0,
            problems_correct: 0,
            active: false,
        };
        tracker.start_new_session();
        tracker
    }

    pub fn start_new_session(&mut self) {
        let now = self.clock.now();
        self.started_at = now;
        self.last_interaction = now;
        self.problems_attempted = 0;
        self.problems_correct = 0;
        self.active = true;

        info!("New session started");
    }

    /// Count an answer, opening a new session if the last one was closed.
    pub fn on_answer(&mut self, outcome: &OutcomeEvent) {
        self.resume();
        self.last_interaction = self.clock.now();
        self.problems_attempted += 1;
        if outcome.is_correct {
            self.problems_correct += 1;
        }
    }

    pub fn on_game_state(&mut self, state: GameState) {
        self.resume();
        self.last_interaction = self.clock.now();

        if state == GameState::MainMenu && self.problems_attempted > 0 {
            // Returned to menu after playing: session complete
            self.end_session();
            self.start_new_session();
        }
    }

    /// Close the session if it has been idle longer than the timeout.
    ///
    /// Returns `true` if the session was closed.
    pub fn check_timeout(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let idle = seconds_between(self.last_interaction, self.clock.now());
        if idle > self.config.timeout.as_secs_f64() {
            info!(idle_seconds = idle, "Session timed out due to inactivity");
            self.end_session();
            return true;
        }
        false
    }

    /// Close the running session and save it into the aggregate statistics.
    ///
    /// Returns `None` if no session was running.
    pub fn end_session(&mut self) -> Option<SessionSummary> {
        if !self.active {
            return None;
        }
        self.active = false;

        let summary = SessionSummary {
            duration_minutes: self.duration_minutes(),
            problems_attempted: self.problems_attempted,
            problems_correct: self.problems_correct,
        };

        self.stats.update(|stats| stats.record_session(&summary));

        info!(
            "Session ended. Duration: {:.1}min, Problems: {}, Correct: {}",
            summary.duration_minutes, summary.problems_attempted, summary.problems_correct
        );

        Some(summary)
    }

    /// Host moved to the background: close the session.
    pub fn pause(&mut self) -> Option<SessionSummary> {
        self.end_session()
    }

    /// Host returned to the foreground: start a fresh session.
    pub fn resume(&mut self) {
        if !self.active {
            self.start_new_session();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn problems_attempted(&self) -> u32 {
        self.problems_attempted
    }

    pub fn problems_correct(&self) -> u32 {
        self.problems_correct
    }

    pub fn duration_minutes(&self) -> f64 {
        seconds_between(self.started_at, self.clock.now()).max(0.0) / 60.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::repository::{InMemorySnapshotRepository, SnapshotRepository};
    use crate::scheduler::FrameScheduler;
    use chrono::TimeZone;

    struct Fixture {
        clock: Arc<ManualClock>,
        repo: Arc<InMemorySnapshotRepository<AggregateUserStats>>,
        scheduler: FrameScheduler,
        tracker: SessionTracker,
    }

    fn fixture(initial: AggregateUserStats) -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        ));
        let repo = Arc::new(InMemorySnapshotRepository::with_value(initial));
        let scheduler = FrameScheduler::new();
        let cache = PersistenceCache::new(Arc::clone(&repo) as _, scheduler.clone());
        let tracker = SessionTracker::new(SessionConfig::default(), Arc::clone(&clock) as _, cache);
        Fixture {
            clock,
            repo,
            scheduler,
            tracker,
        }
    }

    #[test]
    fn test_return_to_menu_ends_session_and_merges_accuracy() {
        let mut f = fixture(AggregateUserStats {
            overall_accuracy: 80.0,
            total_problems_answered: 10,
            ..Default::default()
        });

        for n in 0..10 {
            f.tracker.on_answer(&OutcomeEvent::new(n % 2 == 0, 1000.0));
        }
        f.clock.advance_millis(6 * 60 * 1000);
        f.tracker.on_game_state(GameState::MainMenu);
        f.scheduler.run_end_of_frame();

        let stats = f.repo.load().unwrap().unwrap();
        assert_eq!(stats.total_sessions, 1);
        assert_eq!(stats.overall_accuracy, 65.0);
        assert_eq!(stats.total_problems_answered, 20);
        assert!((stats.total_minutes - 6.0).abs() < 1e-9);

        // A fresh session is already running
        assert!(f.tracker.is_active());
        assert_eq!(f.tracker.problems_attempted(), 0);
    }

    #[test]
    fn test_menu_without_answers_keeps_session() {
        let mut f = fixture(AggregateUserStats::default());
        f.tracker.on_game_state(GameState::MainMenu);
        f.scheduler.run_end_of_frame();

        assert_eq!(f.repo.write_count(), 0);
        assert!(f.tracker.is_active());
    }

    #[test]
    fn test_inactivity_timeout() {
        let mut f = fixture(AggregateUserStats::default());
        f.tracker.on_answer(&OutcomeEvent::correct(500.0));

        f.clock.advance_millis(14 * 60 * 1000);
        assert!(!f.tracker.check_timeout());

        f.clock.advance_millis(2 * 60 * 1000);
        assert!(f.tracker.check_timeout());
        assert!(!f.tracker.is_active());
        assert!(!f.tracker.check_timeout());
    }

    #[test]
    fn test_answer_after_timeout_opens_new_session() {
        let mut f = fixture(AggregateUserStats::default());
        f.tracker.on_answer(&OutcomeEvent::correct(500.0));
        f.clock.advance_millis(16 * 60 * 1000);
        assert!(f.tracker.check_timeout());

        f.tracker.on_answer(&OutcomeEvent::incorrect(900.0));
        assert!(f.tracker.is_active());
        assert_eq!(f.tracker.problems_attempted(), 1);

        f.clock.advance_millis(60 * 1000);
        f.tracker.on_game_state(GameState::MainMenu);
        f.scheduler.run_end_of_frame();

        let stats = f.repo.load().unwrap().unwrap();
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_problems_answered, 2);
        assert_eq!(stats.overall_accuracy, 50.0);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut f = fixture(AggregateUserStats::default());
        f.tracker.on_answer(&OutcomeEvent::correct(500.0));

        let summary = f.tracker.pause().unwrap();
        assert_eq!(summary.problems_attempted, 1);
        assert_eq!(f.tracker.pause(), None);

        f.tracker.resume();
        assert!(f.tracker.is_active());
        f.scheduler.run_end_of_frame();
        assert_eq!(f.repo.load().unwrap().unwrap().total_sessions, 1);
    }
}
