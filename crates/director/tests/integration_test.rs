//! End-to-end runs of the director over file-backed storage.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use director::{
    AggregateUserStats, Director, FileSnapshotRepository, GameState, InteractionLogStore,
    InteractionRecord, InterventionType, JsonLinesLogStore, ManualClock, SnapshotLogStore,
    SnapshotRepository,
};

const LOG_FILE: &str = "interaction_logs.jsonl";
const STATS_FILE: &str = "user_data.json";

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 9, 1, 16, 0, 0).unwrap(),
    ))
}

fn build(dir: &Path, clock: &Arc<ManualClock>) -> Director {
    let log_store = JsonLinesLogStore::open_or_create(dir, LOG_FILE).unwrap();
    let stats = FileSnapshotRepository::<AggregateUserStats>::new(dir, STATS_FILE).unwrap();

    Director::builder()
        .clock(Arc::clone(clock) as _)
        .log_store(log_store)
        .stats_repository(Arc::new(stats))
        .build()
}

fn play(director: &Director, clock: &ManualClock, answers: &[(bool, f64)]) {
    for (n, (is_correct, response_ms)) in answers.iter().enumerate() {
        director.problem_started(format!("problem-{n}"));
        clock.advance_millis(*response_ms as i64 + 500);
        director.answer_attempted(*is_correct, *response_ms);
    }
}

fn read_stats(dir: &Path) -> Option<AggregateUserStats> {
    FileSnapshotRepository::<AggregateUserStats>::new(dir, STATS_FILE)
        .unwrap()
        .load()
        .unwrap()
}

#[test]
fn records_survive_restart_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();

    let director = build(temp_dir.path(), &clock);
    let first_session = director.session_id();
    play(&director, &clock, &[(true, 900.0), (false, 2400.0)]);
    director.tick();
    director.shutdown();

    clock.advance_millis(60_000);
    let director = build(temp_dir.path(), &clock);
    play(&director, &clock, &[(true, 1100.0)]);
    director.tick();

    let records = director.interaction_records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].session_id, first_session);
    assert_eq!(records[2].session_id, director.session_id());
    assert_ne!(first_session, director.session_id());
    assert!(records[0].is_correct);
    assert!(!records[1].is_correct);
    assert!((records[1].hesitation_time_seconds - 0.5).abs() < 1e-9);

    let lines = fs::read_to_string(temp_dir.path().join(LOG_FILE)).unwrap();
    assert_eq!(lines.lines().count(), 3);
}

#[test]
fn stats_are_written_once_per_frame() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();
    let director = build(temp_dir.path(), &clock);

    director.settings().set_zen_mode(true);
    director.settings().set_high_contrast(true);
    director.settings().set_reduced_motion(true);
    assert!(read_stats(temp_dir.path()).is_none());

    director.tick();

    let stats = read_stats(temp_dir.path()).unwrap();
    assert!(stats.accessibility.zen_mode);
    assert!(stats.accessibility.high_contrast);
    assert!(stats.accessibility.reduced_motion);
}

#[test]
fn shutdown_persists_the_running_session() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();
    fs::write(
        temp_dir.path().join(STATS_FILE),
        r#"{"totalSessions": 3, "overallAccuracy": 80.0, "totalProblemsAnswered": 10}"#,
    )
    .unwrap();

    let director = build(temp_dir.path(), &clock);
    let answers: Vec<(bool, f64)> = (0..10).map(|n| (n < 5, 2500.0)).collect();
    play(&director, &clock, &answers);

    // No tick: the termination flush alone must persist the session
    director.shutdown();

    let stats = read_stats(temp_dir.path()).unwrap();
    assert_eq!(stats.total_sessions, 4);
    assert_eq!(stats.total_problems_answered, 20);
    assert_eq!(stats.overall_accuracy, 65.0);
    assert!(stats.total_minutes > 0.0);
}

#[test]
fn dropping_the_director_writes_log_and_stats() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();

    {
        let director = build(temp_dir.path(), &clock);
        play(&director, &clock, &[(true, 900.0)]);
        // Dropped without tick or shutdown
    }

    let lines = fs::read_to_string(temp_dir.path().join(LOG_FILE)).unwrap();
    assert_eq!(lines.lines().count(), 1);
    assert_eq!(read_stats(temp_dir.path()).unwrap().total_sessions, 1);
}

#[test]
fn corrupt_stats_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();
    fs::write(temp_dir.path().join(STATS_FILE), "{ not json").unwrap();

    let director = build(temp_dir.path(), &clock);
    assert_eq!(director.stats(), AggregateUserStats::default());

    play(&director, &clock, &[(true, 800.0)]);
    director.shutdown();

    assert_eq!(read_stats(temp_dir.path()).unwrap().total_sessions, 1);
}

#[test]
fn interventions_reach_host_subscribers() {
    let temp_dir = TempDir::new().unwrap();
    let clock = clock();
    let director = build(temp_dir.path(), &clock);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    director.on_intervention(move |intervention| sink.lock().unwrap().push(intervention));

    director.change_game_state(GameState::Gameplay);
    play(&director, &clock, &[(true, 800.0), (true, 900.0), (true, 1000.0)]);
    play(&director, &clock, &[(false, 3000.0), (false, 3000.0), (false, 3000.0)]);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![InterventionType::LevelUp, InterventionType::ShowDemo]
    );
}

#[test]
fn legacy_log_is_migrated_into_line_store() {
    let temp_dir = TempDir::new().unwrap();
    let legacy_path = temp_dir.path().join("interaction_logs.json");

    let mut old = SnapshotLogStore::new(temp_dir.path(), "interaction_logs.json").unwrap();
    for n in 0..2 {
        old.append(&InteractionRecord {
            session_id: "session_1".into(),
            problem_id: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, n, 0).unwrap(),
            is_correct: n == 0,
            response_time_seconds: 1.5,
            hesitation_time_seconds: 0.25,
            motor_deviation: 0.0,
            simulated: false,
        })
        .unwrap();
    }

    let mut store = JsonLinesLogStore::open_or_create(temp_dir.path(), LOG_FILE).unwrap();
    assert_eq!(store.migrate_legacy(&legacy_path).unwrap(), 2);
    assert!(!legacy_path.exists());
    assert_eq!(store.migrate_legacy(&legacy_path).unwrap(), 0);

    let records = store.get_all().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_correct);
    assert_eq!(records[1].session_id, "session_1");
}
