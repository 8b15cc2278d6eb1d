mod common;

use std::time::Duration;

use awacs_server::domains::tracking::{Direction, Position2D};
use common::{record, Harness, ScriptedSource};
use tokio_test::assert_err;

#[tokio::test]
async fn test_startup_runs_self_test_and_initializes() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &[]), record(2, 0.0, 10.0, 0, &[])]);
    let mut scheduler = harness.scheduler();

    let report = scheduler.startup().await;

    assert_eq!(report.created(), 2);
    assert_eq!(scheduler.registry().len(), 2);
    let calls = harness.actuator.calls();
    assert_eq!(calls.len(), 8);
    assert!(calls[..4].iter().all(|(_, on)| !on));
    assert!(calls[4..].iter().all(|(_, on)| *on));
}

#[tokio::test]
async fn test_startup_survives_fetch_failure() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push_failure();
    let mut scheduler = harness.scheduler();

    scheduler.startup().await;

    assert!(scheduler.registry().is_empty());
    assert!(harness.logger.contains("Failed to initialize tags"));

    // tags show up once the locating service answers
    harness.source.push(vec![record(5, 1.0, 1.0, 0, &[])]);
    scheduler.run_cycle().await;
    assert!(scheduler.registry().contains(5));
}

#[tokio::test]
async fn test_cycle_end_to_end() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, -5.0, 0, &[]), record(2, 0.0, 10.0, 0, &["LZ2"])]);
    harness.source.push(vec![record(1, 0.0, 0.0, 1, &[]), record(2, 0.0, 10.0, 1, &["LZ2"])]);
    let mut scheduler = harness.scheduler();
    scheduler.startup().await;
    harness.actuator.clear();

    let report = scheduler.run_cycle().await;

    let update = report.update.as_ref().unwrap();
    assert_eq!(update.moved(), 1);
    assert_eq!(update.filtered(), 1);

    let a = scheduler.registry().get(1).unwrap();
    assert_eq!(a.position, Some(Position2D::new(0.0, 0.0)));
    assert_eq!(a.heading, Some(0.0));
    assert_eq!(a.vectors.len(), 1);
    assert_eq!(a.vectors[0].distance, Some(10.0));
    assert_eq!(a.vectors[0].direction, Direction::Bearing(0));

    // LZ2 (pin 3) occupied -> off, everything else on
    assert_eq!(harness.actuator.calls(), vec![(2, true), (3, false), (14, true), (4, true)]);

    assert_eq!(report.telemetry.published, 2);
    let published = harness.sink.published();
    assert_eq!(published[0].0, "1");
    assert_eq!(published[0].1["vct"][0]["r"], serde_json::json!(10.0));
}

#[tokio::test]
async fn test_failed_fetch_republishes_previous_state() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, -5.0, 0, &["BSZ1"]), record(2, 3.0, 4.0, 0, &["LZ1"])]);
    harness.source.push(vec![record(1, 0.0, 0.0, 1, &["BSZ1"]), record(2, 3.0, 4.0, 1, &["LZ1"])]);
    harness.source.push_failure();
    let mut scheduler = harness.scheduler();
    scheduler.startup().await;

    scheduler.run_cycle().await;
    let registry_before = scheduler.registry().clone();
    let first = harness.sink.take();

    let report = scheduler.run_cycle().await;

    assert!(report.fetch_failed());
    assert_eq!(scheduler.registry(), &registry_before);
    assert_eq!(harness.sink.take(), first);
    assert!(harness.logger.contains("Failed to update tags"));
}

#[tokio::test]
async fn test_refresh_single_tag() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &[])]);
    harness.source.set_single(record(1, 0.0, 3.0, 2, &["LZ4"]), 1);
    let mut scheduler = harness.scheduler();
    scheduler.startup().await;

    let report = scheduler.refresh_tag(1).await.unwrap();

    assert_eq!(report.moved(), 1);
    let tag = scheduler.registry().get(1).unwrap();
    assert_eq!(tag.position, Some(Position2D::new(0.0, 3.0)));
    assert!(tag.light_zones.contains("LZ4"));

    assert_err!(scheduler.refresh_tag(99).await);
}

#[tokio::test]
async fn test_run_stops_on_shutdown_and_leaves_lights_on() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &["LZ1"])]);
    harness.source.push(vec![record(1, 0.0, 0.0, 1, &["LZ1"])]);
    let mut scheduler = harness.scheduler();
    scheduler.startup().await;
    harness.actuator.clear();

    let cycles = scheduler.run(tokio::time::sleep(Duration::from_millis(30))).await;

    assert!(cycles >= 1);
    let calls = harness.actuator.calls();
    // the first cycle turned LZ1 off; shutdown must end with every pin on
    assert!(calls.contains(&(2, false)));
    assert_eq!(&calls[calls.len() - 4..], &[(2, true), (3, true), (14, true), (4, true)]);
    assert!(harness.logger.contains("safe state"));
}

#[tokio::test]
async fn test_run_survives_panicking_cycle() {
    let harness = Harness::new(ScriptedSource::panicking_when_exhausted());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &[])]);
    harness.source.push(vec![record(1, 5.0, 0.0, 1, &[])]);
    let mut scheduler = harness.scheduler();
    scheduler.startup().await;

    let cycles = scheduler.run(tokio::time::sleep(Duration::from_millis(40))).await;

    assert!(cycles >= 2);
    assert!(harness.logger.contains("aborted by an unexpected failure"));
    // the state committed before the failures is kept
    assert_eq!(
        scheduler.registry().get(1).unwrap().position,
        Some(Position2D::new(5.0, 0.0))
    );
}

#[tokio::test]
async fn test_serve_starts_up_then_cycles() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &[])]);
    harness.source.push(vec![record(1, 0.0, 2.0, 1, &[])]);
    let mut scheduler = harness.scheduler();

    let cycles = scheduler.serve(tokio::time::sleep(Duration::from_millis(30))).await;

    assert!(cycles >= 1);
    assert_eq!(
        scheduler.registry().get(1).unwrap().position,
        Some(Position2D::new(0.0, 2.0))
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_during_self_test_leaves_lights_on() {
    let harness = Harness::new(ScriptedSource::new());
    harness.source.push(vec![record(1, 0.0, 0.0, 0, &["LZ1"])]);
    let mut scheduler = harness.scheduler_with_sweep(Duration::from_millis(400));

    // resolves while the off-sweep is still between pins 3 and 14
    let cycles = scheduler.serve(tokio::time::sleep(Duration::from_millis(500))).await;

    assert_eq!(cycles, 0);
    assert!(scheduler.registry().is_empty());
    let calls = harness.actuator.calls();
    assert_eq!(&calls[..2], &[(2, false), (3, false)]);
    assert_eq!(&calls[2..], &[(2, true), (3, true), (14, true), (4, true)]);
    assert!(harness.logger.contains("Shutdown requested during startup"));
}
