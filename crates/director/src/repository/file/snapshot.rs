//! File-based SnapshotRepository implementation.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::repository::traits::SnapshotRepository;
use crate::repository::Result;

/// Stores a single value as a pretty-printed JSON document.
///
/// Saves overwrite the whole file through a temp file and rename, so a reader
/// never observes a half-written document.
pub struct FileSnapshotRepository<T> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> FileSnapshotRepository<T> {
    /// Create a repository for `base_dir/filename`, creating the directory.
    pub fn new(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(filename.as_ref()),
            _phantom: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> SnapshotRepository<T> for FileSnapshotRepository<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let value = serde_json::from_str(&json)?;

        tracing::debug!("Loaded snapshot from {}", self.path.display());
        Ok(Some(value))
    }

    fn save(&self, value: &T) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(value)?;
        fs::write(&temp_path, json)?;

        // Atomic rename
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!("Saved snapshot to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        volume: u8,
        name: String,
    }

    #[test]
    fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::<Prefs>::new(temp_dir.path(), "prefs.json").unwrap();
        assert_eq!(repo.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::<Prefs>::new(temp_dir.path(), "prefs.json").unwrap();

        let prefs = Prefs {
            volume: 7,
            name: "owl".to_string(),
        };
        repo.save(&prefs).unwrap();

        assert_eq!(repo.load().unwrap(), Some(prefs));
        assert!(!temp_dir.path().join("prefs.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSnapshotRepository::<Prefs>::new(temp_dir.path(), "prefs.json").unwrap();
        fs::write(repo.path(), "{\"volume\": ").unwrap();

        assert!(matches!(repo.load(), Err(RepositoryError::Json(_))));
    }
}
