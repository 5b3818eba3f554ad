//! Platform-specific directories.

use std::path::PathBuf;

const APP_NAME: &str = "learning-director";

/// Directory for persisted learner data
///
/// - macOS: `~/Library/Application Support/learning-director`
/// - Linux: `~/.local/share/learning-director` (or `$XDG_DATA_HOME/...`)
/// - Windows: `%APPDATA%\learning-director`
/// - Fallback: `./save_data`
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./save_data"))
}

/// Directory for diagnostic logs, one subdirectory per session
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/learning-director"))
        .join("logs")
}
