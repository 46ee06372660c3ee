#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use schedmetrics_core::MetricsError;
use schedmetrics_recorder::clock::ManualClock;
use schedmetrics_recorder::{MetricsSettings, Registry, SchedulerMetrics};

fn setup() -> (Registry, SchedulerMetrics, ManualClock) {
    let registry = Registry::new();
    let clock = ManualClock::new();
    let metrics = SchedulerMetrics::register_with_clock(
        &registry,
        &MetricsSettings::default(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    (registry, metrics, clock)
}

fn duration_count(metrics: &SchedulerMetrics, controller: &str) -> u64 {
    metrics
        .scheduling_duration()
        .sample(&[controller])
        .map(|s| s.count)
        .unwrap_or(0)
}

#[test]
fn completed_run_observes_once_and_clears_series() {
    let (registry, metrics, clock) = setup();

    let run = metrics.start_run("provisioning", "run-1").unwrap();
    assert_eq!(run.controller(), "provisioning");
    assert_eq!(run.scheduling_id(), "run-1");
    run.set_queue_depth(25).unwrap();
    clock.advance(Duration::from_millis(1500));
    run.tick().unwrap();

    assert_eq!(metrics.queue_depth().get(&["provisioning", "run-1"]), Some(25.0));
    assert_eq!(metrics.unfinished_work().get(&["provisioning", "run-1"]), Some(1.5));

    let elapsed = run.complete(10).unwrap();
    assert_eq!(elapsed, Duration::from_millis(1500));

    let snap = registry.collect();
    let hist = snap
        .family("karpenter_scheduler_scheduling_duration_seconds")
        .unwrap()
        .histogram(&["provisioning"])
        .unwrap();
    assert_eq!(hist.count, 1);
    assert!((hist.sum - 1.5).abs() < 1e-9);

    let depth = snap.family("karpenter_scheduler_queue_depth").unwrap();
    assert!(depth.series.is_empty());
    let unfinished = snap.family("karpenter_scheduler_unfinished_work_seconds").unwrap();
    assert!(unfinished.series.is_empty());

    let unsched = snap.family("karpenter_scheduler_unschedulable_pods_count").unwrap();
    assert_eq!(unsched.gauge(&["provisioning"]), Some(10.0));
    assert_eq!(metrics.in_flight_runs(), 0);
}

#[test]
fn failed_run_is_still_observed() {
    let (_registry, metrics, clock) = setup();
    let run = metrics.start_run("disruption", "run-f").unwrap();
    run.set_queue_depth(3).unwrap();
    clock.advance(Duration::from_millis(200));

    let elapsed = run.fail().unwrap();
    assert_eq!(elapsed, Duration::from_millis(200));
    assert_eq!(duration_count(&metrics, "disruption"), 1);
    assert_eq!(metrics.queue_depth().get(&["disruption", "run-f"]), None);
    // Failure leaves the unschedulable gauge untouched.
    assert_eq!(metrics.unschedulable_pods().get(&["disruption"]), None);
}

#[test]
fn dropped_run_is_cleaned_up() {
    let (_registry, metrics, _clock) = setup();
    {
        let run = metrics.start_run("provisioning", "cancelled").unwrap();
        run.set_queue_depth(9).unwrap();
    }
    assert_eq!(duration_count(&metrics, "provisioning"), 1);
    assert_eq!(metrics.queue_depth().get(&["provisioning", "cancelled"]), None);
    assert_eq!(metrics.unfinished_work().get(&["provisioning", "cancelled"]), None);
    assert_eq!(metrics.in_flight_runs(), 0);
}

#[test]
fn run_is_cleaned_up_on_panic() {
    let (_registry, metrics, _clock) = setup();
    let m = metrics.clone();
    let res = std::thread::spawn(move || {
        let run = m.start_run("provisioning", "boom").unwrap();
        run.set_queue_depth(1).unwrap();
        panic!("scheduler crashed");
    })
    .join();
    assert!(res.is_err());

    assert_eq!(duration_count(&metrics, "provisioning"), 1);
    assert_eq!(metrics.queue_depth().get(&["provisioning", "boom"]), None);
}

#[test]
fn same_id_cannot_run_twice_concurrently() {
    let (_registry, metrics, _clock) = setup();
    let first = metrics.start_run("provisioning", "dup").unwrap();

    let err = metrics.start_run("provisioning", "dup").unwrap_err();
    assert_eq!(
        err,
        MetricsError::RunInFlight {
            controller: "provisioning".into(),
            scheduling_id: "dup".into(),
        }
    );
    // The rejected start must not have disturbed the live run.
    assert_eq!(metrics.in_flight_runs(), 1);

    // Same id under another controller is a different run.
    let other = metrics.start_run("disruption", "dup").unwrap();

    first.complete(0).unwrap();
    other.complete(0).unwrap();
    // Once finished, the id can be reused.
    metrics.start_run("provisioning", "dup").unwrap().complete(0).unwrap();
    assert_eq!(duration_count(&metrics, "provisioning"), 2);
}

#[test]
fn concurrent_runs_keep_separate_series() {
    let (_registry, metrics, _clock) = setup();
    let a = metrics.start_run("provisioning", "a").unwrap();
    let b = metrics.start_run("provisioning", "b").unwrap();
    a.set_queue_depth(4).unwrap();
    b.set_queue_depth(8).unwrap();

    a.complete(1).unwrap();
    assert_eq!(metrics.queue_depth().get(&["provisioning", "a"]), None);
    assert_eq!(metrics.queue_depth().get(&["provisioning", "b"]), Some(8.0));
    b.complete(2).unwrap();
    assert_eq!(metrics.unschedulable_pods().get(&["provisioning"]), Some(2.0));
}

#[test]
fn refresh_tracks_every_in_flight_run() {
    let (_registry, metrics, clock) = setup();
    let a = metrics.start_run("provisioning", "a").unwrap();
    clock.advance(Duration::from_secs(2));
    let b = metrics.start_run("disruption", "b").unwrap();
    clock.advance(Duration::from_secs(1));

    metrics.refresh_unfinished_work().unwrap();
    assert_eq!(metrics.unfinished_work().get(&["provisioning", "a"]), Some(3.0));
    assert_eq!(metrics.unfinished_work().get(&["disruption", "b"]), Some(1.0));

    a.complete(0).unwrap();
    metrics.refresh_unfinished_work().unwrap();
    // A finished run is not brought back by later refreshes.
    assert_eq!(metrics.unfinished_work().get(&["provisioning", "a"]), None);
    assert_eq!(metrics.unfinished_work().get(&["disruption", "b"]), Some(1.0));
    drop(b);
}

#[test]
fn reused_id_keeps_the_new_runs_series() {
    let (_registry, metrics, _clock) = setup();

    for i in 0..500 {
        let id = format!("r{i}");
        let old = metrics.start_run("p", &id).unwrap();
        old.set_queue_depth(1).unwrap();

        let m = metrics.clone();
        let next_id = id.clone();
        let starter = thread::spawn(move || loop {
            if let Ok(run) = m.start_run("p", &next_id) {
                run.set_queue_depth(5).unwrap();
                return run;
            }
        });

        old.complete(0).unwrap();
        let new = starter.join().unwrap();

        // The finished run must not have removed anything the new one wrote.
        assert_eq!(metrics.queue_depth().get(&["p", &id]), Some(5.0), "{id}");
        assert!(metrics.unfinished_work().get(&["p", &id]).is_some(), "{id}");
        new.complete(0).unwrap();
        assert_eq!(metrics.queue_depth().get(&["p", &id]), None);
    }
}
