//! Integration test: periodic components driven by the scheduler.
//!
//! Checks cadence, phase offsets, long-run grid alignment and
//! run-to-run determinism against a basic clock.

use simloop_clock::BasicClock;
use simloop_core::{shared, LoopState, Periodic, StopCode};
use simloop_engine::{Deadline, Scheduler};
use simloop_test_utils::{CountingComponent, StepLog};

fn scheduler(step: f64, end: f64) -> Scheduler {
    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(step).unwrap()).unwrap();
    s.add_stop_monitor(&shared(Deadline::new(end))).unwrap();
    s
}

#[test]
fn thousand_ticks_at_loop_rate() {
    let mut s = scheduler(0.001, 0.999);
    let log = shared(Periodic::new(StepLog::new(), 0.001));
    s.add_component(log.clone()).unwrap();
    s.run().unwrap();

    let log = log.lock();
    assert_eq!(log.steps(), 1000);
    assert_eq!(log.inner().steps.len(), 1000);
    assert_eq!(log.inner().steps[0], (0.0, 0.0));
    for &(_, dt) in &log.inner().steps[1..] {
        assert!((dt - 0.001).abs() < 1e-9);
    }
}

#[test]
fn slower_component_runs_on_its_own_grid() {
    let mut s = scheduler(0.01, 1.0);
    let log = shared(Periodic::new(StepLog::new(), 0.1).with_phase_offset(0.05));
    s.add_component(log.clone()).unwrap();
    s.run().unwrap();

    let times = log.lock().inner().times();
    assert_eq!(times.len(), 10);
    for (k, t) in times.iter().enumerate() {
        let expected = 0.05 + k as f64 * 0.1;
        assert!((t - expected).abs() < 1e-9, "step {k}: {t} vs {expected}");
    }
}

#[test]
fn deadline_stops_on_the_grid_tick() {
    let mut s = scheduler(0.1, 1.0);
    let counter = shared(CountingComponent::default());
    s.add_component(counter.clone()).unwrap();
    s.run().unwrap();

    assert_eq!(counter.lock().execs, 11);
    assert!((s.time().unwrap() - 1.0).abs() < 1e-9);
    assert_eq!(s.stop_code(), StopCode::Ended);
    assert_eq!(s.state(), LoopState::Stopped);
    assert_eq!(counter.lock().terminates, 1);
}

#[test]
fn repeated_runs_are_identical() {
    let mut s = scheduler(0.01, 2.0);
    let log = shared(Periodic::new(StepLog::new(), 0.03));
    s.add_component(log.clone()).unwrap();

    s.run().unwrap();
    let first = log.lock().inner().steps.clone();
    s.run().unwrap();
    let second = log.lock().inner().steps.clone();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(log.lock().inner().inits, vec![0.0, 0.0]);
}

#[test]
fn terminate_sees_final_time() {
    let mut s = scheduler(0.25, 1.0);
    let log = shared(Periodic::new(StepLog::new(), 0.5));
    s.add_component(log.clone()).unwrap();
    s.run().unwrap();

    let log = log.lock();
    assert_eq!(log.inner().terms, vec![1.0]);
    assert_eq!(log.term_time(), 1.0);
}
