//! Director host configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use director::DirectorConfig;

/// Which interaction log implementation to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogStoreKind {
    /// Newline-delimited records, appended without rewriting history.
    #[default]
    Append,
    /// Whole-array document rewritten on every append.
    Snapshot,
}

impl FromStr for LogStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "jsonl" => Ok(Self::Append),
            "snapshot" | "json" => Ok(Self::Snapshot),
            other => Err(format!("unknown log store kind: {other}")),
        }
    }
}

/// Configuration required to host a director.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    pub director: DirectorConfig,
    /// Directory for `user_data.json` and the interaction log (default: platform-specific)
    pub data_dir: Option<PathBuf>,
    pub log_store: LogStoreKind,
    /// Host frame period driving `tick()`
    pub frame_interval: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            director: DirectorConfig::default(),
            data_dir: None,
            log_store: LogStoreKind::default(),
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl BootstrapConfig {
    /// Load `.env` if present, then read the environment.
    pub fn load() -> Self {
        // Missing .env is fine
        let _ = dotenvy::dotenv();
        Self::from_env()
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DIRECTOR_DATA_DIR` - Directory for persisted data (default: platform-specific)
    /// - `DIRECTOR_WINDOW_SIZE` - Performance window capacity (default: 5)
    /// - `DIRECTOR_FLUENCY_MS` - Fluency threshold in milliseconds (default: 2000)
    /// - `DIRECTOR_MASTERY_BASE` - Starting mastery score (default: 0.4)
    /// - `DIRECTOR_MASTERY_HIGH` - Level-up threshold (default: 0.85)
    /// - `DIRECTOR_MASTERY_LOW` - Scaffold threshold (default: 0.25)
    /// - `DIRECTOR_MASTERY_COOLDOWN` - Outcomes between mastery interventions (default: 0)
    /// - `DIRECTOR_SESSION_TIMEOUT_MINUTES` - Inactivity timeout (default: 15)
    /// - `DIRECTOR_FRAME_MS` - Frame interval in milliseconds (default: 16)
    /// - `DIRECTOR_LOG_STORE` - `append` or `snapshot` (default: append)
    /// - `DIRECTOR_SIMULATED` - Mark records as automated play (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let director = &mut config.director;

        config.data_dir = lookup("DIRECTOR_DATA_DIR").map(PathBuf::from);

        // Performance window
        if let Some(capacity) = read_env::<usize>(&lookup, "DIRECTOR_WINDOW_SIZE") {
            director.window.capacity = capacity.max(1);
        }
        if let Some(ms) = read_env::<f64>(&lookup, "DIRECTOR_FLUENCY_MS") {
            director.window.fluency_threshold_ms = ms;
            director.mastery.fast_threshold_ms = ms;
        }

        // Mastery regulator
        if let Some(base) = read_env::<f64>(&lookup, "DIRECTOR_MASTERY_BASE") {
            director.mastery.base_value = base;
        }
        if let Some(high) = read_env::<f64>(&lookup, "DIRECTOR_MASTERY_HIGH") {
            director.mastery.high_threshold = high;
        }
        if let Some(low) = read_env::<f64>(&lookup, "DIRECTOR_MASTERY_LOW") {
            director.mastery.low_threshold = low;
        }
        if let Some(cooldown) = read_env::<u32>(&lookup, "DIRECTOR_MASTERY_COOLDOWN") {
            director.mastery.cooldown_outcomes = cooldown;
        }

        if let Some(minutes) = read_env::<u64>(&lookup, "DIRECTOR_SESSION_TIMEOUT_MINUTES") {
            director.session.timeout = Duration::from_secs(minutes * 60);
        }

        // Accept the bare variable as "true"
        if let Some(simulated) = read_env::<bool>(&lookup, "DIRECTOR_SIMULATED") {
            director.logger.simulated = simulated;
        } else if lookup("DIRECTOR_SIMULATED").is_some() {
            director.logger.simulated = true;
        }

        if let Some(ms) = read_env::<u64>(&lookup, "DIRECTOR_FRAME_MS") {
            config.frame_interval = Duration::from_millis(ms.max(1));
        }
        if let Some(kind) = read_env::<LogStoreKind>(&lookup, "DIRECTOR_LOG_STORE") {
            config.log_store = kind;
        }

        config
    }
}

fn read_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
{
    lookup(key)?.parse().ok()
}
