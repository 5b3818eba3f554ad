//! File-based repository implementations.

mod json_lines;
mod legacy;
mod snapshot;
mod snapshot_log;

pub use json_lines::JsonLinesLogStore;
pub use snapshot::FileSnapshotRepository;
pub use snapshot_log::SnapshotLogStore;
