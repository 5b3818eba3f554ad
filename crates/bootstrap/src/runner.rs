//! Frame loop driving the director from a tokio runtime.
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use director::Director;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::builder::DirectorBootstrap;
use crate::config::BootstrapConfig;
use crate::{dirs, logging};

/// Publish the initial state, tick `director` every `frame_interval` until
/// `shutdown` resolves, then run the termination flush.
///
/// Returns the number of frames ticked.
pub async fn run_frame_loop(
    director: Director,
    frame_interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    let mut interval = time::interval(frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    director.start();

    let mut frames = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                director.tick();
                frames += 1;
            }
        }
    }

    info!(frames, "Frame loop stopped");
    director.shutdown();
    frames
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C, shutting down: {}", e);
    }
}

/// Host entry point: load configuration from the environment, log to the
/// platform log directory, and drive a director until Ctrl-C.
pub async fn run() -> Result<()> {
    run_until(BootstrapConfig::load(), &dirs::log_dir(), shutdown_signal()).await
}

/// Set up logging under `log_dir`, build a director from `config`, and drive
/// it until `shutdown` resolves.
pub async fn run_until(
    config: BootstrapConfig,
    log_dir: &Path,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let frame_interval = config.frame_interval;

    let bootstrap = DirectorBootstrap::new(config);
    logging::setup_logging(log_dir, bootstrap.session_id())?;

    let director = bootstrap.build();
    run_frame_loop(director, frame_interval, shutdown).await;

    Ok(())
}
