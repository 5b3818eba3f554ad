//! Composition root.
//!
//! [`Director`] owns one instance of every component, wires their
//! subscriptions on a shared [`EventRouter`] and exposes the handful of calls a
//! host loop needs: [`start`](Director::start) once subscribers are in place,
//! publish gameplay events, [`tick`](Director::tick) once per frame and
//! [`shutdown`](Director::shutdown) on exit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::analysis::{MasteryConfig, MasteryRegulator, ProgressionAnalyzer, WindowConfig};
use crate::clock::{Clock, SystemClock};
use crate::events::{
    Event, EventRouter, GameState, GuidePersonality, InterventionType, OutcomeEvent,
    SubscriptionId, Topic,
};
use crate::persistence::PersistenceCache;
use crate::repository::{
    InMemoryLogStore, InMemorySnapshotRepository, InteractionLogStore, InteractionRecord,
    SnapshotRepository,
};
use crate::scheduler::FrameScheduler;
use crate::session::{
    AccessibilitySettings, AggregateUserStats, SessionConfig, SessionSummary, SessionTracker,
};
use crate::telemetry::{InteractionLogger, LoggerConfig, new_session_id};

/// Configuration for every component the director builds.
#[derive(Debug, Clone, Default)]
pub struct DirectorConfig {
    pub window: WindowConfig,
    pub mastery: MasteryConfig,
    pub logger: LoggerConfig,
    pub session: SessionConfig,
}

/// Builder for [`Director`].
///
/// Storage defaults to in-memory implementations and the clock to the system
/// clock.
pub struct DirectorBuilder {
    config: DirectorConfig,
    clock: Option<Arc<dyn Clock>>,
    log_store: Option<Box<dyn InteractionLogStore>>,
    stats_repository: Option<Arc<dyn SnapshotRepository<AggregateUserStats>>>,
    session_id: Option<String>,
}

impl DirectorBuilder {
    fn new() -> Self {
        Self {
            config: DirectorConfig::default(),
            clock: None,
            log_store: None,
            stats_repository: None,
            session_id: None,
        }
    }

    /// Override the component configuration
    pub fn config(mut self, config: DirectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Storage for interaction records
    pub fn log_store(mut self, store: impl InteractionLogStore + 'static) -> Self {
        self.log_store = Some(Box::new(store));
        self
    }

    /// Storage for the aggregate statistics snapshot
    pub fn stats_repository(
        mut self,
        repository: Arc<dyn SnapshotRepository<AggregateUserStats>>,
    ) -> Self {
        self.stats_repository = Some(repository);
        self
    }

    /// Fixed session id; derived from the clock when not set.
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn build(self) -> Director {
        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let session_id = self
            .session_id
            .unwrap_or_else(|| new_session_id(clock.as_ref()));
        let log_store = self
            .log_store
            .unwrap_or_else(|| Box::new(InMemoryLogStore::new()));
        let stats_repository = self
            .stats_repository
            .unwrap_or_else(|| Arc::new(InMemorySnapshotRepository::<AggregateUserStats>::new()));

        let router = EventRouter::new();
        let scheduler = FrameScheduler::new();
        let stats = PersistenceCache::new(stats_repository, scheduler.clone());

        let progression = Arc::new(Mutex::new(ProgressionAnalyzer::new(config.window)));
        let mastery = Arc::new(Mutex::new(MasteryRegulator::new(config.mastery)));
        let logger = Arc::new(Mutex::new(InteractionLogger::new(
            config.logger,
            session_id.clone(),
            Arc::clone(&clock),
            log_store,
        )));
        let session = Arc::new(Mutex::new(SessionTracker::new(
            config.session,
            clock,
            stats.clone(),
        )));
        let settings = AccessibilitySettings::new(stats.clone(), router.clone());

        let mut director = Director {
            router,
            scheduler,
            stats,
            settings,
            progression,
            mastery,
            logger,
            session,
            subscriptions: Vec::new(),
            closed: false,
        };
        director.wire();

        info!(session_id = %session_id, "Director ready");
        director
    }
}

/// Handle to a fully wired set of components.
///
/// Handlers hold clones of the router and stay registered until the director
/// is shut down or dropped; either way the session is closed and everything
/// buffered is written.
pub struct Director {
    router: EventRouter,
    scheduler: FrameScheduler,
    stats: PersistenceCache<AggregateUserStats>,
    settings: AccessibilitySettings,
    progression: Arc<Mutex<ProgressionAnalyzer>>,
    mastery: Arc<Mutex<MasteryRegulator>>,
    logger: Arc<Mutex<InteractionLogger>>,
    session: Arc<Mutex<SessionTracker>>,
    subscriptions: Vec<SubscriptionId>,
    closed: bool,
}

impl Director {
    pub fn builder() -> DirectorBuilder {
        DirectorBuilder::new()
    }

    fn wire(&mut self) {
        // Answer subscribers run in this order: window, mastery, logger, session
        let progression = Arc::clone(&self.progression);
        let router = self.router.clone();
        self.subscriptions
            .push(self.router.subscribe(Topic::Answer, move |event| {
                if let Event::AnswerAttempted(outcome) = event {
                    let intervention = lock(&progression).on_outcome(outcome);
                    if let Some(intervention) = intervention {
                        router.publish(Event::InterventionTriggered(intervention));
                    }
                }
                Ok(())
            }));

        let mastery = Arc::clone(&self.mastery);
        let router = self.router.clone();
        self.subscriptions
            .push(self.router.subscribe(Topic::Answer, move |event| {
                if let Event::AnswerAttempted(outcome) = event {
                    let update = lock(&mastery).update(outcome.is_correct, outcome.response_time_ms);
                    router.publish(Event::MasteryChanged(update.score));
                    if let Some(intervention) = update.intervention {
                        debug!(score = update.score, ?intervention, "Mastery threshold crossed");
                        router.publish(Event::InterventionTriggered(intervention));
                    }
                }
                Ok(())
            }));

        let logger = Arc::clone(&self.logger);
        self.subscriptions
            .push(self.router.subscribe(Topic::Answer, move |event| {
                if let Event::AnswerAttempted(outcome) = event {
                    lock(&logger).on_outcome(outcome);
                }
                Ok(())
            }));

        let session = Arc::clone(&self.session);
        self.subscriptions
            .push(self.router.subscribe(Topic::Answer, move |event| {
                if let Event::AnswerAttempted(outcome) = event {
                    lock(&session).on_answer(outcome);
                }
                Ok(())
            }));

        let logger = Arc::clone(&self.logger);
        self.subscriptions
            .push(self.router.subscribe(Topic::Problem, move |event| {
                if let Event::ProblemStarted { problem_id } = event {
                    lock(&logger).on_problem_shown(problem_id);
                }
                Ok(())
            }));

        let session = Arc::clone(&self.session);
        self.subscriptions
            .push(self.router.subscribe(Topic::GameState, move |event| {
                if let Event::GameStateChanged(state) = event {
                    lock(&session).on_game_state(*state);
                }
                Ok(())
            }));
    }

    /// Shared router; hosts subscribe here for interventions, mastery and
    /// guide lines.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    pub fn settings(&self) -> &AccessibilitySettings {
        &self.settings
    }

    pub fn problem_started(&self, problem_id: impl Into<String>) {
        self.router.publish(Event::problem_started(problem_id));
    }

    pub fn answer_attempted(&self, is_correct: bool, response_time_ms: f64) {
        self.router
            .publish(Event::AnswerAttempted(OutcomeEvent::new(is_correct, response_time_ms)));
    }

    pub fn change_game_state(&self, state: GameState) {
        self.router.publish(Event::GameStateChanged(state));
    }

    pub fn guide_spoke(&self, personality: GuidePersonality, message: impl Into<String>) {
        self.router.publish(Event::guide_spoke(personality, message));
    }

    /// Drag deviation sample for the problem on screen.
    pub fn motor_sample(&self, deviation: f64) {
        lock(&self.logger).on_motor_sample(deviation);
    }

    /// Host moved to the background: end the session and flush telemetry.
    pub fn pause(&self) -> Option<SessionSummary> {
        let summary = lock(&self.session).pause();
        lock(&self.logger).flush();
        summary
    }

    /// Host returned to the foreground.
    pub fn resume(&self) {
        lock(&self.session).resume();
    }

    /// End of one host frame.
    ///
    /// Closes an idle session, then runs deferred writes and flushes buffered
    /// telemetry so everything the frame produced reaches storage once.
    pub fn tick(&self) {
        lock(&self.session).check_timeout();
        self.scheduler.run_end_of_frame();
        lock(&self.logger).flush();
    }

    /// Publish the starting mastery score.
    ///
    /// Call once after the host has subscribed, before the first frame.
    pub fn start(&self) {
        let score = self.mastery_score();
        debug!(score, "Publishing initial mastery");
        self.router.publish(Event::MasteryChanged(score));
    }

    /// Terminate: close the session and write everything synchronously.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let summary = lock(&self.session).end_session();
        lock(&self.logger).flush();
        self.stats.shutdown();

        // Handlers own router clones; unsubscribing breaks the cycle so the
        // components and their stores are dropped.
        for id in self.subscriptions.drain(..) {
            self.router.unsubscribe(id);
        }

        info!(
            problems = summary.map(|s| s.problems_attempted).unwrap_or_default(),
            "Director shut down"
        );
    }

    pub fn mastery_score(&self) -> f64 {
        lock(&self.mastery).score()
    }

    /// Rolling accuracy of the current performance window.
    pub fn window_accuracy(&self) -> f64 {
        lock(&self.progression).window().accuracy()
    }

    pub fn session_id(&self) -> String {
        lock(&self.logger).session_id().to_string()
    }

    pub fn session_active(&self) -> bool {
        lock(&self.session).is_active()
    }

    /// Aggregate statistics as currently cached.
    pub fn stats(&self) -> AggregateUserStats {
        self.stats.load()
    }

    /// Every interaction record in the log store, oldest first.
    pub fn interaction_records(&self) -> Vec<InteractionRecord> {
        lock(&self.logger).records()
    }

    /// Subscribe to interventions from both the window and the mastery
    /// regulator.
    pub fn on_intervention(
        &self,
        handler: impl Fn(InterventionType) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.router.subscribe(Topic::Intervention, move |event| {
            if let Event::InterventionTriggered(intervention) = event {
                handler(*intervention);
            }
            Ok(())
        })
    }
}

impl Drop for Director {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
