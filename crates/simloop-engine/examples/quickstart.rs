//! simloop quickstart: a bouncing ball with a recorder and an envelope.
//!
//! Demonstrates:
//!   1. Building a simulation from a `SimulationConfig`
//!   2. Publishing component state into a `Registry`
//!   3. Recording snapshots at a slower cadence than the loop
//!   4. Ending the run with an envelope stop condition
//!   5. Writing the recording to disk and reading it back
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example quickstart

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use simloop_core::{shared, Component, ComponentError, Signal, StopCode};
use simloop_engine::{
    EnvelopeViolation, FnComponent, SignalCurve, SignalTube, Simulation, SimulationConfig,
};
use simloop_registry::{FrameReader, Recorder, Registry};
use tracing_subscriber::EnvFilter;

// ---- Parameters -------------------------------------------------------

const GRAVITY: f64 = -9.81;
const RESTITUTION: f64 = 0.8;
const DROP_HEIGHT: f64 = 10.0;
const CEILING: f64 = DROP_HEIGHT + 0.01;

// ---- Component: ballistic ball with a lossy floor ---------------------

struct Ball {
    height: Signal<f64>,
    velocity: Signal<f64>,
    bounces: Signal<u32>,
    last_time: f64,
}

impl Ball {
    fn new(registry: &Registry) -> Self {
        let ball = Self {
            height: Signal::new(DROP_HEIGHT),
            velocity: Signal::new(0.0),
            bounces: Signal::new(0),
            last_time: 0.0,
        };
        registry.publish("ball.height", &ball.height);
        registry.publish("ball.velocity", &ball.velocity);
        registry.publish("ball.bounces", &ball.bounces);
        ball
    }
}

impl Component for Ball {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        self.height.set(DROP_HEIGHT);
        self.velocity.set(0.0);
        self.bounces.set(0);
        self.last_time = time;
        Ok(())
    }

    fn exec(&mut self, time: f64) -> Result<(), ComponentError> {
        let dt = time - self.last_time;
        self.last_time = time;

        let mut v = self.velocity.get() + GRAVITY * dt;
        let mut h = self.height.get() + v * dt;
        if h < 0.0 {
            h = -h * RESTITUTION;
            v = -v * RESTITUTION;
            self.bounces.update(|n| *n += 1);
        }
        self.height.set(h);
        self.velocity.set(v);
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut sim = Simulation::new(SimulationConfig {
        step_size: 0.001,
        end_time: Some(20.0),
        report_interval: Some(5.0),
        ..Default::default()
    })?;

    let registry = Arc::new(Registry::new());
    let ball = shared(Ball::new(&registry));
    sim.add_component(ball.clone())?;

    let recorder = shared(Recorder::periodic(Arc::clone(&registry), 0.1));
    sim.add_component(recorder.clone())?;

    // The ball must stay above the floor and below its drop height.
    let time = Signal::new(0.0);
    let t = time.clone();
    sim.add_component(shared(
        FnComponent::new()
            .on_step(move |now, _| {
                t.set(now);
                Ok(())
            })
            .periodic(0.001),
    ))?;
    let tube = SignalTube::new(
        SignalCurve::from_points(&[(0.0, -0.01), (20.0, -0.01)])?,
        SignalCurve::from_points(&[(0.0, CEILING), (20.0, CEILING)])?,
    );
    let envelope = shared(EnvelopeViolation::new(
        time,
        ball.lock().height.clone(),
        tube,
    ));
    sim.add_stop_monitor(&envelope)?;

    sim.run()?;

    let code = sim.stop_code();
    println!("stopped at t = {:.3} with code: {code}", sim.time());
    println!("final state: {}", registry.to_json());
    if code == StopCode::ObjectivesMissed {
        println!("the ball left its envelope");
    }

    // ---- Persist and read back the recording ---------------------------

    let path = std::env::temp_dir().join("simloop-quickstart.log");
    {
        let mut out = BufWriter::new(File::create(&path)?);
        recorder.lock().inner().write_to(&mut out)?;
    }
    let frames = FrameReader::new(BufReader::new(File::open(&path)?))
        .frames()
        .collect::<Result<Vec<_>, _>>()?;
    println!(
        "recorded {} frames ({} bytes each) to {}",
        frames.len(),
        frames.first().map_or(0, |f| f.payload.len()),
        path.display()
    );

    // Rewind the registry to the middle of the run.
    if let Some(mid) = frames.get(frames.len() / 2) {
        let report = registry.restore(&mid.payload)?;
        println!(
            "restored t = {:.1}: {} values, height = {:.3}",
            mid.time,
            report.applied,
            ball.lock().height.get()
        );
    }

    Ok(())
}
