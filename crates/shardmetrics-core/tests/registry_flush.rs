//! Registry flush semantics under concurrency.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use shardmetrics_core::{Histogram, MetricKey, MetricRegistry};

fn key(name: &'static str, labels: &[&str]) -> MetricKey {
    MetricKey::new(name, labels.iter().copied())
}

#[test]
fn flush_resets_state() {
    let registry = MetricRegistry::new();
    let k = key("coordinator_search_latency_millis", &["logs", "true"]);
    registry.record_histogram(&k, 10.0);
    registry.record_histogram(&k, 20.0);

    let first = registry.flush();
    let h = first.histogram(&k).unwrap();
    assert_eq!(h.count(), 2);
    assert_eq!(h.average(), 15.0);

    let second = registry.flush();
    assert!(second.is_empty());
    assert!(second.samples().is_empty());
}

#[test]
fn label_order_distinguishes_keys() {
    let registry = MetricRegistry::new();
    let ab = key("index_shard_cpu_time_nanosecond", &["a", "b", "search"]);
    let ba = key("index_shard_cpu_time_nanosecond", &["b", "a", "search"]);
    registry.record_counter(&ab, 5);
    registry.record_counter(&ba, 7);

    let snap = registry.flush();
    assert_eq!(snap.counter(&ab), Some(5));
    assert_eq!(snap.counter(&ba), Some(7));
    assert_eq!(snap.counters().len(), 2);
}

#[test]
fn snapshot_keys_are_sorted() {
    let registry = MetricRegistry::new();
    for idx in ["zeta", "alpha", "mid"] {
        registry.record_histogram(&key("coordinator_bulk_latency_millis", &[idx, "true"]), 1.0);
    }
    let snap = registry.flush();
    let names: Vec<&str> = snap
        .histograms()
        .iter()
        .map(|(k, _)| k.labels()[0].as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn concurrent_records_on_one_key_are_all_counted() {
    const THREADS: usize = 8;
    const PER_THREAD: u64 = 5_000;

    let registry = Arc::new(MetricRegistry::new());
    let k = key("coordinator_search_latency_millis", &["hot", "true"]);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let k = k.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..PER_THREAD {
                    registry.record_histogram(&k, (i % 100) as f64);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let snap = registry.flush();
    assert_eq!(snap.histogram(&k).unwrap().count(), THREADS as u64 * PER_THREAD);
}

#[test]
fn observations_racing_flush_land_exactly_once() {
    const WRITERS: usize = 6;
    const PER_WRITER: u64 = 20_000;

    let registry = Arc::new(MetricRegistry::new());
    let hist = key("coordinator_bulk_latency_millis", &["race", "false"]);
    let counter = key("index_shard_memory_allocation_bytes", &["race", "0", "index"]);
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let hist = hist.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    registry.record_histogram(&hist, 3.0);
                    registry.record_counter(&counter, 1);
                }
            })
        })
        .collect();

    let flusher = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        let hist = hist.clone();
        let counter = counter.clone();
        thread::spawn(move || {
            let mut hist_total = 0;
            let mut counter_total = 0;
            while !done.load(Ordering::Acquire) {
                let snap = registry.flush();
                hist_total += snap.histogram(&hist).map_or(0, |h| h.count());
                counter_total += snap.counter(&counter).unwrap_or(0);
                thread::yield_now();
            }
            (hist_total, counter_total)
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Release);
    let (mut hist_total, mut counter_total) = flusher.join().unwrap();

    let last = registry.flush();
    hist_total += last.histogram(&hist).map_or(0, |h| h.count());
    counter_total += last.counter(&counter).unwrap_or(0);

    let expected = WRITERS as u64 * PER_WRITER;
    assert_eq!(hist_total, expected);
    assert_eq!(counter_total, expected);
}
