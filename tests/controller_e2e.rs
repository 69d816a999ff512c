//! Control loop end-to-end: snapshots in, plans out, cycle log on disk

use flextraff::controller::{spawn_jsonl_writer, ControlLoop, CycleRecord};
use flextraff::{EngineConfig, TimingEngine};

#[tokio::test]
async fn test_replay_with_cycle_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("cycles.jsonl");

    let snapshots = [
        r#"{"junction_id": 7, "demand": [45, 38, 52, 41]}"#,
        r#"{"junction_id": 7, "demand": null}"#,
        r#"{"junction_id": 7, "demand": [25, 25, 25, 25], "connectivity": {"internet": false}}"#,
        r#"{"junction_id": 7, "demand": [25, 25, 25, 25], "connectivity": {"internet": true, "backend": true}}"#,
    ]
    .join("\n");

    let engine = TimingEngine::new(EngineConfig::default()).unwrap();
    let (recorder, writer) = spawn_jsonl_writer(&log_path, 16);
    let mut control = ControlLoop::new(engine).with_recorder(recorder);

    let mut out = Vec::new();
    let summary = control.run(snapshots.as_bytes(), &mut out).await.unwrap();
    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.fallbacks, 2);
    drop(control);

    assert_eq!(writer.await.unwrap().unwrap(), 4);

    let logged: Vec<CycleRecord> = std::fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let printed: Vec<CycleRecord> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(logged, printed);

    assert_eq!(logged[0].cycle_budget, 180);
    assert_eq!(logged[0].green_times.total(), 180);
    assert!(logged[1].used_fallback);
    assert!(logged[2].used_fallback);
    assert_eq!(logged[2].total_cycle_time, 380);
    assert!(!logged[3].used_fallback);
    assert_eq!(logged[3].cycle_budget, 120);
}

#[tokio::test]
async fn test_recorder_failure_does_not_change_plans() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending, so the writer task fails.
    let (recorder, writer) = spawn_jsonl_writer(dir.path(), 1);
    assert!(writer.await.unwrap().is_err());

    let engine = TimingEngine::new(EngineConfig::default()).unwrap();
    let expected = engine.compute_allocation_with_fallback(Some(&[26, 25, 25, 25]), false);

    let mut control = ControlLoop::new(engine).with_recorder(recorder);
    let mut out = Vec::new();
    let input = r#"{"demand": [26, 25, 25, 25]}"#;
    control.run(input.as_bytes(), &mut out).await.unwrap();

    let record: CycleRecord = serde_json::from_str(String::from_utf8(out).unwrap().trim()).unwrap();
    assert_eq!(record.green_times, expected.green_times);
    assert_eq!(record.cycle_budget, expected.cycle_budget);
}
