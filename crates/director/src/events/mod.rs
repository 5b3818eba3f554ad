//! Topic-based event routing.
//!
//! Producers publish typed [`Event`]s; consumers subscribe per [`Topic`] and
//! never hold references to each other.

mod bus;
mod types;

pub use bus::{Event, EventRouter, HandlerError, HandlerResult, SubscriptionId, Topic};
pub use types::{GameState, GuideLine, GuidePersonality, InterventionType, OutcomeEvent};
