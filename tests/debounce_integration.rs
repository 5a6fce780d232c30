//! End-to-end tests of the coalescing engine through its public API:
//! registry-shared debouncers and the rebalancer feedback loop reconfiguring
//! a live timer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use debounce_core::{Debouncer, DebouncerConfig, DebouncerRegistry, RebalanceOptions};

fn batching_config(interval_ms: u64, auto_rebalance: bool) -> DebouncerConfig {
    DebouncerConfig {
        enabled: true,
        interval_ms,
        auto_rebalance,
    }
}

#[test]
fn registry_shares_one_coalescing_engine_per_key() {
    debounce_core::init_logging();

    let registry: DebouncerRegistry<u32> = DebouncerRegistry::new();
    let executions = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&executions);
    let debouncer = registry.get_or_create("regenerate", &batching_config(300, false), move |_| {
        thread::sleep(Duration::from_millis(50));
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    // A second lookup must reuse the same engine, so all submitters below
    // share one flush regardless of which handle they went through.
    let same = registry.get_or_create("regenerate", &batching_config(300, false), |_| Ok(()));
    assert!(Arc::ptr_eq(&debouncer, &same));

    let barrier = Arc::new(std::sync::Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|payload| {
            let debouncer = Arc::clone(&same);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                debouncer.submit(payload);
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("submitter thread panicked");
    }

    assert_eq!(executions.load(Ordering::SeqCst), 1);
}

/// Drives the full feedback loop: a debouncer whose action suddenly gets
/// cheap rebalances its period below the floor and drops into immediate mode.
///
/// Window size 1 means every sample evicts its predecessor, so the second
/// flush already sees a baseline: first flush ~40 ms, second flush ~10 ms
/// gives deviation 0.75 and a rebalanced period of ~20 ms, under the 250 ms
/// floor.
#[test]
fn cheap_executions_rebalance_into_immediate_mode() {
    let sleep_ms = Arc::new(AtomicU64::new(40));
    let executions = Arc::new(AtomicUsize::new(0));

    let per_run_sleep = Arc::clone(&sleep_ms);
    let counter = Arc::clone(&executions);
    let debouncer = Arc::new(Debouncer::with_options(
        move |_: u32| {
            thread::sleep(Duration::from_millis(per_run_sleep.load(Ordering::SeqCst)));
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        &batching_config(300, true),
        RebalanceOptions {
            window_size: 1,
            min_deviation: 0.2,
            period_multiplier: 2.0,
        },
    ));
    assert!(debouncer.is_batching());

    debouncer.submit(1); // flush 1: ~40 ms sample, no baseline yet
    sleep_ms.store(10, Ordering::SeqCst);
    debouncer.submit(2); // flush 2: ~10 ms sample, rebalance fires below floor

    // The timer thread applies the period feedback on its next loop turn.
    let deadline = Instant::now() + Duration::from_secs(2);
    while debouncer.is_batching() {
        assert!(
            Instant::now() < deadline,
            "debouncer never fell back to immediate mode"
        );
        thread::sleep(Duration::from_millis(10));
    }

    // Immediate mode: a submit executes synchronously, far faster than the
    // original 300 ms window.
    let started = Instant::now();
    debouncer.submit(3);
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(executions.load(Ordering::SeqCst), 3);
}

#[test]
fn submitters_arriving_across_windows_get_separate_flushes() {
    let executions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&executions);
    let debouncer = Arc::new(Debouncer::new(
        move |_: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
        &batching_config(300, false),
    ));

    debouncer.submit(1);
    debouncer.submit(2);

    // Sequential blocking submits cannot land in the same window: each one
    // waits out its own flush before the next is queued.
    assert_eq!(executions.load(Ordering::SeqCst), 2);
}
