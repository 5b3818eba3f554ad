//! Diagnostic logging setup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE: &str = "director.log";

/// Install the global subscriber writing to `log_dir/<session_id>/director.log`.
///
/// The filter comes from `RUST_LOG` with `info` as the floor. Returns the path
/// of the log file.
pub fn setup_logging(log_dir: &Path, session_id: &str) -> Result<PathBuf> {
    // Create session-specific log directory
    let session_log_dir = log_dir.join(session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!(
            "Failed to create log directory: {}",
            session_log_dir.display()
        )
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, LOG_FILE);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    // Leak the guard to keep file writer alive
    std::mem::forget(guard);

    let log_path = session_log_dir.join(LOG_FILE);
    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}", log_path.display());

    Ok(log_path)
}
