//! Adaptive learning director.
//!
//! Watches a learner answer problems, decides when to make the game harder or
//! easier, and records every answer for later analysis.
//!
//! Modules are organized by responsibility:
//! - [`events`] provides the topic-based router every component talks through
//! - [`analysis`] hosts the performance window, progression analyzer and
//!   mastery regulator
//! - [`telemetry`] turns answers into interaction records
//! - [`repository`] stores interaction records and persisted snapshots
//! - [`persistence`] batches snapshot writes to the end of the frame
//! - [`session`] tracks play sessions, aggregate statistics and accessibility
//!   settings
//! - [`director`] wires everything together behind one handle
pub mod analysis;
pub mod clock;
pub mod director;
pub mod events;
pub mod persistence;
pub mod repository;
pub mod scheduler;
pub mod session;
pub mod telemetry;

pub use analysis::{
    MasteryConfig, MasteryRegulator, MasteryUpdate, PerformanceWindow, ProgressionAnalyzer,
    WindowConfig,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use director::{Director, DirectorBuilder, DirectorConfig};
pub use events::{
    Event, EventRouter, GameState, GuideLine, GuidePersonality, HandlerError, HandlerResult,
    InterventionType, OutcomeEvent, SubscriptionId, Topic,
};
pub use persistence::{FlushState, PersistenceCache};
pub use repository::{
    FileSnapshotRepository, InMemoryLogStore, InMemorySnapshotRepository, InteractionLogStore,
    InteractionRecord, JsonLinesLogStore, RepositoryError, SnapshotLogStore, SnapshotRepository,
};
pub use scheduler::FrameScheduler;
pub use session::{
    AccessibilityFlags, AccessibilitySettings, AggregateUserStats, SessionConfig, SessionSummary,
    SessionTracker,
};
pub use telemetry::{InteractionLogger, LoggerConfig};
