//! Host-side setup for the learning director.
//!
//! Provides environment configuration, platform directories, logging and the
//! frame loop that drives [`director::Director::tick`].
//!
//! A host binary calls [`run`] from its tokio runtime; it returns once Ctrl-C
//! is received and the director has written its state.
pub mod builder;
pub mod config;
pub mod dirs;
pub mod logging;
pub mod runner;

pub use builder::DirectorBootstrap;
pub use config::{BootstrapConfig, LogStoreKind};
pub use runner::{run, run_frame_loop, run_until, shutdown_signal};
