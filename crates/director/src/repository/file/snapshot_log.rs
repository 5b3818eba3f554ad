//! Whole-file-rewrite interaction log.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::legacy;
use crate::repository::traits::InteractionLogStore;
use crate::repository::{InteractionRecord, RepositoryError, Result};

/// Interaction log that rewrites the entire history on every append.
///
/// Simple and obviously correct, but each append costs O(total records) in
/// both reads and writes. Kept as the reference behavior for
/// [`JsonLinesLogStore`](super::JsonLinesLogStore) and for installs that
/// still need the whole-array file format.
pub struct SnapshotLogStore {
    path: PathBuf,
}

impl SnapshotLogStore {
    pub fn new(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;
        Ok(Self {
            path: base_dir.join(filename.as_ref()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<InteractionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        legacy::parse(&content, legacy::written_at(&self.path)).ok_or_else(|| {
            RepositoryError::CorruptedData(format!(
                "{} is not a valid interaction log",
                self.path.display()
            ))
        })
    }

    fn write(&self, records: &[InteractionRecord]) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, legacy::to_string(records)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl InteractionLogStore for SnapshotLogStore {
    fn append(&mut self, record: &InteractionRecord) -> Result<()> {
        let mut records = self.read()?;
        records.push(record.clone());
        self.write(&records)?;

        debug!(
            "Rewrote {} with {} records",
            self.path.display(),
            records.len()
        );
        Ok(())
    }

    fn get_all(&mut self) -> Result<Vec<InteractionRecord>> {
        self.read()
    }

    fn clear(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(correct: bool) -> InteractionRecord {
        InteractionRecord {
            session_id: "session_snapshot".to_string(),
            problem_id: None,
            timestamp: Utc::now(),
            is_correct: correct,
            response_time_seconds: 1.25,
            hesitation_time_seconds: 0.0,
            motor_deviation: 0.1,
            simulated: true,
        }
    }

    #[test]
    fn test_append_rewrites_whole_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = SnapshotLogStore::new(temp_dir.path(), "logs.json").unwrap();

        let first = record(true);
        let second = record(false);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.trim_start().starts_with('{'));
        assert!(content.contains("\"logs\""));

        assert_eq!(store.get_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn test_corrupt_file_is_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = SnapshotLogStore::new(temp_dir.path(), "logs.json").unwrap();
        fs::write(store.path(), "{ truncated").unwrap();

        assert!(matches!(
            store.append(&record(true)),
            Err(RepositoryError::CorruptedData(_))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ truncated");
    }

    #[test]
    fn test_clear() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = SnapshotLogStore::new(temp_dir.path(), "logs.json").unwrap();
        store.append(&record(true)).unwrap();
        store.clear().unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }
}
