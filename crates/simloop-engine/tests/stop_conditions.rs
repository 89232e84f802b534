//! Integration test: built-in stop conditions ending scheduler runs.

use std::time::Instant;

use simloop_clock::BasicClock;
use simloop_core::{shared, LoopState, Signal, StopCode, StopCondition};
use simloop_engine::{
    Deadline, EnvelopeViolation, FnComponent, Hook, LoopError, Scheduler, SignalCurve,
    SignalTube, Simulation, SimulationConfig, StopIf, ThresholdExceed,
};

fn ramp(slope: f64, value: Signal<f64>) -> FnComponent {
    FnComponent::new().on_step(move |t, _| {
        value.set(slope * t);
        Ok(())
    })
}

fn band() -> SignalTube {
    SignalTube::new(
        SignalCurve::from_points(&[(0.0, -0.1), (10.0, -0.1)]).unwrap(),
        SignalCurve::from_points(&[(0.0, 1.1), (10.0, 1.1)]).unwrap(),
    )
}

/// Run `y = f(t)` against `band()` with `x = t`, sampled every 0.1,
/// until the envelope fires or t reaches 10.
fn run_in_band(f: impl Fn(f64) -> f64 + Send + 'static) -> (Scheduler, Signal<f64>) {
    let x = Signal::new(0.0);
    let y = Signal::new(0.0);
    let (xs, ys) = (x.clone(), y.clone());

    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(0.1).unwrap()).unwrap();
    s.add_component(shared(
        FnComponent::new()
            .on_step(move |t, _| {
                xs.set(t);
                ys.set(f(t));
                Ok(())
            })
            .periodic(0.1),
    ))
    .unwrap();
    s.add_stop_monitor(&shared(EnvelopeViolation::new(x, y.clone(), band())))
        .unwrap();
    s.add_stop_monitor(&shared(Deadline::new(10.0))).unwrap();
    s.run().unwrap();
    (s, y)
}

#[test]
fn envelope_violation_misses_objectives() {
    let x = Signal::new(0.0);
    let y = Signal::new(0.0);

    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(0.1).unwrap()).unwrap();
    let xs = x.clone();
    s.add_component(shared(
        FnComponent::new()
            .on_step(move |t, _| {
                xs.set(t);
                Ok(())
            })
            .periodic(0.1),
    ))
    .unwrap();
    s.add_component(shared(ramp(0.4, y.clone()).periodic(0.1)))
        .unwrap();
    let envelope = shared(EnvelopeViolation::new(x.clone(), y.clone(), band()));
    s.add_stop_monitor(&envelope).unwrap();
    s.add_stop_monitor(&shared(Deadline::new(10.0))).unwrap();
    s.run().unwrap();

    // y = 0.4 t leaves the band once t > 2.75.
    assert_eq!(s.stop_code(), StopCode::ObjectivesMissed);
    assert!((s.time().unwrap() - 2.8).abs() < 1e-9);
    assert!(y.get() > 1.1);
}

#[test]
fn envelope_holds_while_signal_stays_in_band() {
    let (s, y) = run_in_band(|t| 0.5 + 0.6 * (t * 3.0).sin());

    assert_eq!(s.stop_code(), StopCode::Ended);
    assert!((s.time().unwrap() - 10.0).abs() < 1e-9);
    assert!((-0.1..=1.1).contains(&y.get()));
}

#[test]
fn envelope_fires_on_first_sample_below_band() {
    // 1 - 0.3 t is -0.08 at t = 3.6 and -0.11 at t = 3.7.
    let (s, y) = run_in_band(|t| 1.0 - 0.3 * t);

    assert_eq!(s.stop_code(), StopCode::ObjectivesMissed);
    assert!((s.time().unwrap() - 3.7).abs() < 1e-9);
    assert!(y.get() < -0.1);
}

#[test]
fn envelope_without_curves_fails_initialize() {
    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(0.1).unwrap()).unwrap();
    let mut tube = band();
    tube.set_upper(SignalCurve::default());
    s.add_stop_monitor(&shared(EnvelopeViolation::new(
        Signal::new(0.0),
        Signal::new(0.0),
        tube,
    )))
    .unwrap();

    let err = s.initialize().unwrap_err();
    assert!(matches!(
        err,
        LoopError::Component {
            index: 0,
            hook: Hook::Init,
            ..
        }
    ));
    assert_eq!(s.state(), LoopState::Stopped);
}

#[test]
fn threshold_stops_with_configured_code() {
    let level = Signal::new(0.0);
    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(0.5).unwrap()).unwrap();
    s.add_component(shared(ramp(1.0, level.clone()).periodic(0.5)))
        .unwrap();
    let stop = shared(
        ThresholdExceed::new(level.clone(), 3.0).with_mode(StopCode::ObjectivesReached),
    );
    s.add_stop_monitor(&stop).unwrap();
    s.run().unwrap();

    // 3.0 is not strictly above the limit; 3.5 is.
    assert_eq!(s.time(), Some(3.5));
    assert_eq!(s.stop_code(), StopCode::ObjectivesReached);

    stop.lock().set_limit(5.0);
    s.run().unwrap();
    assert_eq!(s.time(), Some(5.5));
}

#[test]
fn first_registered_code_wins() {
    let flag = Signal::new(false);
    let mut s = Scheduler::new();
    s.set_clock(BasicClock::new(1.0).unwrap()).unwrap();
    let f = flag.clone();
    s.add_component(shared(
        FnComponent::new()
            .on_step(move |t, _| {
                f.set(t >= 3.0);
                Ok(())
            })
            .periodic(1.0),
    ))
    .unwrap();
    let flag_stop = shared(StopIf::stop_if(flag).with_mode(StopCode::ObjectivesReached));
    let deadline = shared(Deadline::new(3.0));
    s.add_stop_monitor(&flag_stop).unwrap();
    s.add_stop_monitor(&deadline).unwrap();
    s.run().unwrap();

    assert_eq!(s.time(), Some(3.0));
    assert_eq!(flag_stop.lock().code(), StopCode::ObjectivesReached);
    assert_eq!(deadline.lock().code(), StopCode::Ended);
    assert_eq!(s.stop_code(), StopCode::ObjectivesReached);
}

#[test]
fn real_time_simulation_respects_wall_clock() {
    let mut sim = Simulation::new(SimulationConfig {
        step_size: 0.01,
        end_time: Some(0.2),
        real_time: true,
        acceleration: 2.0,
        ..Default::default()
    })
    .unwrap();

    let started = Instant::now();
    sim.run().unwrap();
    let wall = started.elapsed().as_secs_f64();

    assert_eq!(sim.stop_code(), StopCode::Ended);
    assert!((sim.time() - 0.2).abs() < 1e-9);
    // 0.2 s of simulation at 2x takes at least 0.1 s of wall time.
    assert!(wall >= 0.1 - 1e-3, "finished after {wall} s");
}

#[test]
fn abort_handle_stops_a_simulation_from_another_thread() {
    let mut sim = Simulation::new(SimulationConfig {
        step_size: 0.001,
        real_time: true,
        ..Default::default()
    })
    .unwrap();
    let handle = sim.abort_handle();

    let aborter = std::thread::spawn(move || loop {
        if handle.abort().is_ok() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(5));
    });
    sim.run().unwrap();
    aborter.join().unwrap();

    assert_eq!(sim.state(), LoopState::Stopped);
    assert_eq!(sim.stop_code(), StopCode::None);
}
