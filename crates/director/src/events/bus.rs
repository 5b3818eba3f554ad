//! Topic-based synchronous event router.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, trace};

use super::types::{GameState, GuideLine, GuidePersonality, InterventionType, OutcomeEvent};
use crate::session::AccessibilityFlags;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Screen/state machine changes
    GameState,
    /// A new problem was presented
    Problem,
    /// The learner answered a problem
    Answer,
    /// Difficulty or scaffolding changes requested by analyzers
    Intervention,
    /// Mastery score updates
    Mastery,
    /// Guide dialogue
    Guide,
    /// Learner settings changes
    Settings,
}

/// Event wrapper that carries the typed payload for its topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    GameStateChanged(GameState),
    ProblemStarted { problem_id: String },
    AnswerAttempted(OutcomeEvent),
    InterventionTriggered(InterventionType),
    /// Mastery score in `[0, 1]`.
    MasteryChanged(f64),
    GuideSpoke(GuideLine),
    SettingsChanged(AccessibilityFlags),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::GameStateChanged(_) => Topic::GameState,
            Event::ProblemStarted { .. } => Topic::Problem,
            Event::AnswerAttempted(_) => Topic::Answer,
            Event::InterventionTriggered(_) => Topic::Intervention,
            Event::MasteryChanged(_) => Topic::Mastery,
            Event::GuideSpoke(_) => Topic::Guide,
            Event::SettingsChanged(_) => Topic::Settings,
        }
    }

    pub fn problem_started(problem_id: impl Into<String>) -> Self {
        Event::ProblemStarted {
            problem_id: problem_id.into(),
        }
    }

    pub fn guide_spoke(personality: GuidePersonality, message: impl Into<String>) -> Self {
        Event::GuideSpoke(GuideLine {
            personality,
            message: message.into(),
        })
    }
}

/// Failure reported by a subscriber.
///
/// The router logs it and keeps dispatching to the remaining handlers.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Opaque token returned by [`EventRouter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    topics: HashMap<Topic, Vec<Subscription>>,
}

/// Topic-based event router
///
/// Handlers run synchronously on the publishing thread, in the order they
/// subscribed. There is no buffering: an event published to a topic without
/// subscribers is dropped.
///
/// The handler list is copied before dispatch, so a handler may publish to
/// another topic, and subscriptions changed during a dispatch only affect
/// later publishes.
pub struct EventRouter {
    registry: Arc<RwLock<Registry>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
        }
    }

    /// Register a handler for a topic
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let id = SubscriptionId(registry.next_id);
        registry.next_id += 1;

        registry.topics.entry(topic).or_default().push(Subscription {
            id,
            handler: Arc::new(handler),
        });

        trace!(?topic, id = id.0, "subscribed");
        id
    }

    /// Remove a handler. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for subscriptions in registry.topics.values_mut() {
            if let Some(pos) = subscriptions.iter().position(|s| s.id == id) {
                subscriptions.remove(pos);
                return true;
            }
        }
        false
    }

    /// Publish an event to every handler of its topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        let handlers: Vec<Handler> = {
            let registry = self
                .registry
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match registry.topics.get(&topic) {
                Some(subscriptions) if !subscriptions.is_empty() => subscriptions
                    .iter()
                    .map(|s| Arc::clone(&s.handler))
                    .collect(),
                _ => {
                    // No subscribers for this topic - this is normal, not an error
                    trace!("No subscribers for topic {:?}", topic);
                    return;
                }
            }
        };

        for (index, handler) in handlers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(
                    target: "director::events",
                    ?topic,
                    handler = index,
                    error = %e,
                    "Event handler failed, continuing"
                ),
                Err(panic) => error!(
                    target: "director::events",
                    ?topic,
                    handler = index,
                    panic = panic_message(&*panic),
                    "Event handler panicked, continuing"
                ),
            }
        }
    }

    /// Number of handlers currently registered for a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .topics
            .get(&topic)
            .map_or(0, Vec::len)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl Clone for EventRouter {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}
