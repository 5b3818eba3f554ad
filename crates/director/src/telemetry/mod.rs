//! Per-answer interaction telemetry.

mod logger;

pub use logger::{InteractionLogger, LoggerConfig, new_session_id};
