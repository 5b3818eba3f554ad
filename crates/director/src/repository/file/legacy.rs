//! Whole-array interaction log format.
//!
//! Older installs wrote the entire history as one JSON document, either a
//! bare array or an object wrapping it:
//!
//! ```text
//! { "logs": [ {record}, {record}, ... ] }
//! ```
//!
//! Each entry is either a full [`InteractionRecord`] or the reduced entry the
//! first app release wrote, which carries no session or timestamp and keeps
//! the response time in milliseconds:
//!
//! ```text
//! { "isCorrect": true, "responseTimeMs": 1250.0, "hesitationTime": 0.5, "dragDeviation": 0.1 }
//! ```
//!
//! [`SnapshotLogStore`](super::SnapshotLogStore) still writes this format;
//! [`JsonLinesLogStore`](super::JsonLinesLogStore) reads and migrates it.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::InteractionRecord;

/// Session id given to reduced entries, which never recorded one.
pub(super) const LEGACY_SESSION_ID: &str = "legacy";

#[derive(Deserialize)]
struct LegacyLogFile {
    logs: Vec<LegacyEntry>,
}

#[derive(Serialize)]
struct LegacyLogFileRef<'a> {
    logs: &'a [InteractionRecord],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyEntry {
    Record(InteractionRecord),
    Reduced(ReducedEntry),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReducedEntry {
    is_correct: bool,
    response_time_ms: f64,
    /// Seconds before the first touch
    #[serde(default)]
    hesitation_time: f64,
    #[serde(default)]
    drag_deviation: f64,
}

impl LegacyEntry {
    fn into_record(self, imported_at: DateTime<Utc>) -> InteractionRecord {
        match self {
            Self::Record(record) => record,
            Self::Reduced(entry) => InteractionRecord {
                session_id: LEGACY_SESSION_ID.to_string(),
                problem_id: None,
                timestamp: imported_at,
                is_correct: entry.is_correct,
                response_time_seconds: entry.response_time_ms / 1000.0,
                hesitation_time_seconds: entry.hesitation_time,
                motor_deviation: entry.drag_deviation,
                simulated: false,
            },
        }
    }
}

/// Parse `content` as a whole-array document.
///
/// Reduced entries are stamped with `imported_at`. Returns `None` when the
/// content is not in the legacy format (including newline-delimited logs,
/// which never parse as a single document).
pub(super) fn parse(content: &str, imported_at: DateTime<Utc>) -> Option<Vec<InteractionRecord>> {
    let trimmed = content.trim_start();
    let entries = if trimmed.starts_with('[') {
        serde_json::from_str::<Vec<LegacyEntry>>(trimmed).ok()?
    } else {
        serde_json::from_str::<LegacyLogFile>(trimmed).ok()?.logs
    };

    Some(
        entries
            .into_iter()
            .map(|entry| entry.into_record(imported_at))
            .collect(),
    )
}

/// Last write time of `path`, or the Unix epoch when the platform can't tell.
pub(super) fn written_at(path: &Path) -> DateTime<Utc> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Serialize records as a pretty-printed wrapper document.
pub(super) fn to_string(records: &[InteractionRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&LegacyLogFileRef { logs: records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const RECORD: &str = r#"{"sessionId":"s","timestamp":"2025-01-01T00:00:00Z","isCorrect":true,"responseTimeSeconds":0.5,"hesitationTimeSeconds":0.1}"#;

    // As written by the first release, pretty-printed with no timestamp
    const REDUCED: &str = r#"{
    "logs": [
        {
            "isCorrect": true,
            "responseTimeMs": 1250.0,
            "hesitationTime": 0.5,
            "dragDeviation": 0.10000000149011612
        },
        {
            "isCorrect": false,
            "responseTimeMs": 4000.0,
            "hesitationTime": 0.0,
            "dragDeviation": 0.10000000149011612
        }
    ]
}"#;

    fn imported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_wrapper_and_bare_array() {
        let wrapped = format!("{{\n  \"logs\": [{RECORD}, {RECORD}]\n}}");
        assert_eq!(parse(&wrapped, imported_at()).map(|r| r.len()), Some(2));

        let bare = format!("  [{RECORD}]");
        assert_eq!(parse(&bare, imported_at()).map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_line_delimited_is_not_legacy() {
        let lines = format!("{RECORD}\n{RECORD}\n");
        assert!(parse(&lines, imported_at()).is_none());
        assert!(parse(RECORD, imported_at()).is_none());
    }

    #[test]
    fn test_reduced_entries_are_converted() {
        let records = parse(REDUCED, imported_at()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].session_id, LEGACY_SESSION_ID);
        assert_eq!(records[0].timestamp, imported_at());
        assert!(records[0].is_correct);
        assert_eq!(records[0].response_time_seconds, 1.25);
        assert_eq!(records[0].hesitation_time_seconds, 0.5);
        assert!((records[0].motor_deviation - 0.1).abs() < 1e-6);
        assert!(records[0].problem_id.is_none());
        assert!(!records[1].is_correct);
        assert_eq!(records[1].response_time_seconds, 4.0);
    }

    #[test]
    fn test_mixed_entries_keep_full_records_intact() {
        let mixed = format!(
            r#"{{"logs": [{RECORD}, {{"isCorrect": false, "responseTimeMs": 800.0}}]}}"#
        );
        let records = parse(&mixed, imported_at()).unwrap();

        assert_eq!(records[0].session_id, "s");
        assert_eq!(
            records[0].timestamp,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(records[1].session_id, LEGACY_SESSION_ID);
        assert_eq!(records[1].response_time_seconds, 0.8);
        assert_eq!(records[1].motor_deviation, 0.0);
    }
}
