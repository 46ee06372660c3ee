#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use futures_util::future::join_all;
use schedmetrics_recorder::{MetricsSettings, Registry, SchedulerMetrics};

fn setup() -> (Registry, SchedulerMetrics) {
    let registry = Registry::new();
    let metrics = SchedulerMetrics::register(&registry, &MetricsSettings::default()).unwrap();
    (registry, metrics)
}

#[test]
fn hundred_threads_no_lost_updates() {
    let (registry, metrics) = setup();

    let handles: Vec<_> = (0..100)
        .map(|_| {
            let m = metrics.clone();
            thread::spawn(move || m.schedulers_created().inc(&[]).unwrap())
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snap = registry.collect();
    let fam = snap
        .family("karpenter_scheduler_logyball_new_scheduler_created_total")
        .unwrap();
    assert_eq!(fam.counter(&[]), Some(100));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn hundred_tasks_no_lost_updates() {
    let (_registry, metrics) = setup();

    let tasks = (0..100).map(|i| {
        let m = metrics.clone();
        tokio::spawn(async move {
            let domain = if i % 2 == 0 { "zone-a" } else { "zone-b" };
            m.record_domain_scan(domain, i < 10).unwrap();
        })
    });
    for r in join_all(tasks).await {
        r.unwrap();
    }

    let scanned = metrics.domains_scanned();
    assert_eq!(scanned.get(&["zone-a"]).unwrap() + scanned.get(&["zone-b"]).unwrap(), 100);
    let inserted = metrics.domains_inserted();
    assert_eq!(inserted.get(&["zone-a"]).unwrap() + inserted.get(&["zone-b"]).unwrap(), 10);
}

#[test]
fn concurrent_runs_with_distinct_ids() {
    let (registry, metrics) = setup();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let m = metrics.clone();
            thread::spawn(move || {
                let run = m.start_run("provisioning", &format!("run-{i}")).unwrap();
                for depth in (0..10).rev() {
                    run.set_queue_depth(depth).unwrap();
                    run.tick().unwrap();
                }
                run.complete(0).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snap = registry.collect();
    let hist = snap
        .family("karpenter_scheduler_scheduling_duration_seconds")
        .unwrap()
        .histogram(&["provisioning"])
        .unwrap();
    assert_eq!(hist.count, 32);
    assert!(snap.family("karpenter_scheduler_queue_depth").unwrap().series.is_empty());
    assert!(snap
        .family("karpenter_scheduler_unfinished_work_seconds")
        .unwrap()
        .series
        .is_empty());
}

#[test]
fn snapshots_never_see_torn_histograms() {
    let (registry, metrics) = setup();
    let stop = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let m = metrics.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    m.scheduling_duration()
                        .observe(&["provisioning"], Duration::from_millis(7))
                        .unwrap();
                }
            })
        })
        .collect();

    for _ in 0..200 {
        let snap = registry.collect();
        if let Some(h) = snap
            .family("karpenter_scheduler_scheduling_duration_seconds")
            .unwrap()
            .histogram(&["provisioning"])
        {
            // Every observation lands in the 0.01 bucket, so a consistent
            // series has bucket(0.01) == count.
            let b = h.buckets.iter().find(|b| b.upper_bound == 0.01).unwrap();
            assert_eq!(b.cumulative_count, h.count);
            assert!(h.buckets.iter().all(|b| b.cumulative_count <= h.count));
        }
    }

    stop.store(true, Ordering::Relaxed);
    for w in writers {
        w.join().unwrap();
    }
}
