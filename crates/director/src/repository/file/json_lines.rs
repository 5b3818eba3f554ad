//! Append-only newline-delimited JSON interaction log.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::legacy;
use crate::repository::traits::InteractionLogStore;
use crate::repository::{InteractionRecord, RepositoryError, Result};

/// Write buffer size; records are small, so this holds many ticks' worth.
const WRITE_BUFFER_BYTES: usize = 64 * 1024;

/// Append-only log storing one JSON record per line:
///
/// ```text
/// {record}\n
/// {record}\n
/// ...
/// ```
///
/// Appends go through a buffered writer and reach the file on
/// [`flush`](InteractionLogStore::flush), which the director calls once per
/// tick. Reads are served from an in-memory cache that is dropped whenever an
/// append succeeds and rebuilt from the file on the next read.
///
/// Lines that fail to parse (for example a record cut short by an interrupted
/// process) are skipped with a warning.
pub struct JsonLinesLogStore {
    path: PathBuf,
    writer: BufWriter<File>,
    cache: Option<Vec<InteractionRecord>>,
}

impl JsonLinesLogStore {
    /// Open or create the log file.
    ///
    /// Creates the directory and file if they don't exist. An existing file
    /// in the whole-array format is rewritten as lines before appending.
    pub fn open_or_create(base_dir: impl AsRef<Path>, filename: impl AsRef<str>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)?;

        let path = base_dir.join(filename.as_ref());

        let existing = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match legacy::parse(&content, legacy::written_at(&path)) {
                Some(records) => {
                    info!(
                        "Converting whole-array log {} to line format ({} records)",
                        path.display(),
                        records.len()
                    );
                    rewrite_as_lines(&path, &records)?;
                    records
                }
                None => {
                    terminate_last_line(&path, &content)?;
                    parse_lines(&content, &path)
                }
            }
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);

        debug!(
            "Opened interaction log: {} ({} records)",
            path.display(),
            existing.len()
        );

        Ok(Self {
            path,
            writer,
            cache: Some(existing),
        })
    }

    /// Import a whole-array log file written by an older install.
    ///
    /// The records are appended to this log and the legacy file is renamed
    /// with a `.migrated` suffix so the import runs only once. Returns the
    /// number of imported records; a missing legacy file imports nothing.
    pub fn migrate_legacy(&mut self, legacy_path: impl AsRef<Path>) -> Result<usize> {
        let legacy_path = legacy_path.as_ref();
        if !legacy_path.exists() {
            return Ok(0);
        }

        let content = fs::read_to_string(legacy_path)?;
        let imported_at = legacy::written_at(legacy_path);
        let records = legacy::parse(&content, imported_at).ok_or_else(|| {
            RepositoryError::CorruptedData(format!(
                "{} is not a whole-array interaction log",
                legacy_path.display()
            ))
        })?;

        for record in &records {
            self.append(record)?;
        }
        self.flush()?;

        let mut migrated = legacy_path.as_os_str().to_owned();
        migrated.push(".migrated");
        fs::rename(legacy_path, PathBuf::from(migrated))?;

        info!(
            "Migrated {} records from {}",
            records.len(),
            legacy_path.display()
        );

        Ok(records.len())
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_from_disk(&mut self) -> Result<Vec<InteractionRecord>> {
        self.writer.flush()?;
        let content = fs::read_to_string(&self.path)?;
        Ok(parse_lines(&content, &self.path))
    }
}

impl InteractionLogStore for JsonLinesLogStore {
    fn append(&mut self, record: &InteractionRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        self.writer.write_all(&line)?;
        self.cache = None;

        Ok(())
    }

    fn get_all(&mut self) -> Result<Vec<InteractionRecord>> {
        if let Some(cached) = &self.cache {
            return Ok(cached.clone());
        }

        let records = self.read_from_disk()?;
        self.cache = Some(records.clone());
        Ok(records)
    }

    fn clear(&mut self) -> Result<()> {
        self.writer.flush()?;
        // Truncate, then reopen for appending so later writes start at zero.
        File::create(&self.path)?;
        let file = OpenOptions::new().append(true).open(&self.path)?;
        self.writer = BufWriter::with_capacity(WRITE_BUFFER_BYTES, file);
        self.cache = Some(Vec::new());

        info!("Cleared interaction log {}", self.path.display());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonLinesLogStore {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(
                "Failed to flush interaction log '{}' on drop: {}",
                self.path.display(),
                e
            );
        }
    }
}

fn parse_lines(content: &str, path: &Path) -> Vec<InteractionRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "Skipping malformed line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                );
                None
            }
        })
        .collect()
}

/// Ends a cut-off last line so the next append starts on a line of its own.
fn terminate_last_line(path: &Path, content: &str) -> Result<()> {
    if content.is_empty() || content.ends_with('\n') {
        return Ok(());
    }

    warn!("Interaction log {} ends mid-line, terminating it", path.display());
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(b"\n")?;
    Ok(())
}

fn rewrite_as_lines(path: &Path, records: &[InteractionRecord]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    {
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}
