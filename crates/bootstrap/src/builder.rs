//! Opens storage and assembles a [`Director`] from [`BootstrapConfig`].
use std::path::{Path, PathBuf};
use std::sync::Arc;

use director::telemetry::new_session_id;
use director::{
    AggregateUserStats, Director, DirectorBuilder, FileSnapshotRepository, JsonLinesLogStore,
    RepositoryError, SnapshotLogStore, SystemClock,
};
use tracing::{info, warn};

use crate::config::{BootstrapConfig, LogStoreKind};
use crate::dirs;

pub const USER_DATA_FILE: &str = "user_data.json";
pub const LOG_FILE: &str = "interaction_logs.jsonl";
pub const LEGACY_LOG_FILE: &str = "interaction_logs.json";

/// Builder that opens file-backed storage and wires a director.
///
/// Storage that cannot be opened is replaced by an in-memory store so the
/// learner can keep playing; the failure is logged.
pub struct DirectorBootstrap {
    config: BootstrapConfig,
    session_id: String,
}

impl DirectorBootstrap {
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            session_id: new_session_id(&SystemClock),
        }
    }

    /// Session id shared by the director and the diagnostic log directory.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir.clone().unwrap_or_else(dirs::data_dir)
    }

    pub fn build(self) -> Director {
        let data_dir = self.data_dir();
        info!("Director data directory: {}", data_dir.display());

        let mut builder = Director::builder()
            .config(self.config.director.clone())
            .session_id(self.session_id.clone());

        match FileSnapshotRepository::<AggregateUserStats>::new(&data_dir, USER_DATA_FILE) {
            Ok(repository) => builder = builder.stats_repository(Arc::new(repository)),
            Err(e) => warn!("User data unavailable, statistics kept in memory: {}", e),
        }

        builder = match with_log_store(builder, &data_dir, self.config.log_store) {
            Ok(builder) => builder,
            Err((builder, e)) => {
                warn!("Interaction log unavailable, records kept in memory: {}", e);
                builder
            }
        };

        builder.build()
    }
}

/// Attach the configured log store, handing the builder back untouched on
/// failure.
fn with_log_store(
    builder: DirectorBuilder,
    data_dir: &Path,
    kind: LogStoreKind,
) -> Result<DirectorBuilder, (DirectorBuilder, RepositoryError)> {
    match kind {
        LogStoreKind::Append => match open_append_log(data_dir) {
            Ok(store) => Ok(builder.log_store(store)),
            Err(e) => Err((builder, e)),
        },
        LogStoreKind::Snapshot => match SnapshotLogStore::new(data_dir, LEGACY_LOG_FILE) {
            Ok(store) => Ok(builder.log_store(store)),
            Err(e) => Err((builder, e)),
        },
    }
}

/// Open the line log and import any whole-array log left by an older install.
fn open_append_log(data_dir: &Path) -> director::repository::Result<JsonLinesLogStore> {
    let mut store = JsonLinesLogStore::open_or_create(data_dir, LOG_FILE)?;

    match store.migrate_legacy(data_dir.join(LEGACY_LOG_FILE)) {
        Ok(0) => {}
        Ok(count) => info!("Imported {} legacy interaction records", count),
        // Keep the legacy file for inspection and carry on with the new log
        Err(e) => warn!("Legacy interaction log not migrated: {}", e),
    }

    Ok(store)
}
