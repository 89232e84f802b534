//! A scheduler assembled from a [`SimulationConfig`].

use std::sync::Arc;

use parking_lot::Mutex;
use simloop_clock::{BasicClock, RealTimeClock};
use simloop_core::{
    shared, Component, LoopState, Periodic, Shared, Signal, StopCode, StopCondition,
};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::LoopError;
use crate::reporter::TimeReporter;
use crate::scheduler::{AbortHandle, Scheduler};
use crate::stops::{Deadline, ThresholdExceed};

/// A [`Scheduler`] with its clock, deadline and reporter built from a
/// configuration.
///
/// # Examples
///
/// ```
/// use simloop_core::{Signal, StopCode};
/// use simloop_engine::{FnComponent, Simulation, SimulationConfig};
///
/// let mut sim = Simulation::new(SimulationConfig {
///     step_size: 0.1,
///     end_time: Some(10.0),
///     ..Default::default()
/// })
/// .unwrap();
///
/// let level = Signal::new(0.0_f64);
/// let l = level.clone();
/// sim.add_component(simloop_core::shared(
///     FnComponent::new()
///         .on_step(move |_, dt| {
///             l.update(|v| *v += dt);
///             Ok(())
///         })
///         .periodic(0.1),
/// ))
/// .unwrap();
/// sim.add_stop_value(level, 0.5).unwrap();
///
/// sim.run().unwrap();
/// assert_eq!(sim.stop_code(), StopCode::Ended);
/// assert!(sim.time() < 1.0);
/// ```
pub struct Simulation {
    config: SimulationConfig,
    scheduler: Scheduler,
    deadline: Option<Shared<Deadline>>,
    reporter: Option<Shared<Periodic<TimeReporter>>>,
}

impl Simulation {
    /// Validate `config` and build the loop.
    ///
    /// Registers a [`Deadline`] first when `end_time` is set, then a
    /// [`TimeReporter`] when `report_interval` is set. Components added
    /// later run after them.
    pub fn new(config: SimulationConfig) -> Result<Self, LoopError> {
        config.validate()?;
        let mut scheduler = Scheduler::new();

        if config.real_time {
            let mut clock = RealTimeClock::real_time(config.step_size)?
                .with_start_time(config.start_time)
                .with_acceleration(config.acceleration)?;
            clock.set_poll_interval(config.poll_interval());
            scheduler.set_clock(clock)?;
        } else {
            let clock = BasicClock::new(config.step_size)?.with_start_time(config.start_time);
            scheduler.set_clock(clock)?;
        }

        let deadline = match config.end_time {
            Some(end) => {
                let deadline = shared(Deadline::new(end));
                scheduler.add_stop_monitor(&deadline)?;
                Some(deadline)
            }
            None => None,
        };

        let reporter = match config.report_interval {
            Some(interval) => {
                let reporter = shared(TimeReporter::periodic(interval));
                scheduler.add_component(reporter.clone())?;
                Some(reporter)
            }
            None => None,
        };

        debug!(
            step_size = config.step_size,
            real_time = config.real_time,
            end_time = ?config.end_time,
            "simulation assembled"
        );
        Ok(Self {
            config,
            scheduler,
            deadline,
            reporter,
        })
    }

    /// Register a component after the built-in ones.
    pub fn add_component(&mut self, component: Arc<Mutex<dyn Component>>) -> Result<(), LoopError> {
        self.scheduler.add_component(component)
    }

    /// Register a stop condition.
    pub fn add_stop_condition(
        &mut self,
        condition: Arc<Mutex<dyn StopCondition>>,
    ) -> Result<(), LoopError> {
        self.scheduler.add_stop_condition(condition)
    }

    /// Register an object that is both a component and a stop condition.
    pub fn add_stop_monitor<M>(&mut self, monitor: &Shared<M>) -> Result<(), LoopError>
    where
        M: Component + StopCondition + 'static,
    {
        self.scheduler.add_stop_monitor(monitor)
    }

    /// End the run once `value` strictly exceeds `limit`.
    pub fn add_stop_value<T>(
        &mut self,
        value: Signal<T>,
        limit: T,
    ) -> Result<Shared<ThresholdExceed<T>>, LoopError>
    where
        T: PartialOrd + Copy + Send + 'static,
    {
        let stop = shared(ThresholdExceed::new(value, limit));
        self.scheduler.add_stop_monitor(&stop)?;
        Ok(stop)
    }

    /// Initialize, execute and terminate the loop.
    pub fn run(&mut self) -> Result<(), LoopError> {
        self.scheduler.run()
    }

    /// The underlying loop.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The underlying loop, for lifecycle control beyond [`run`](Self::run).
    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    /// A handle that aborts the running loop.
    pub fn abort_handle(&self) -> AbortHandle {
        self.scheduler.abort_handle()
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.scheduler.time().unwrap_or(self.config.start_time)
    }

    /// Loop state.
    pub fn state(&self) -> LoopState {
        self.scheduler.state()
    }

    /// The configuration the loop was built from.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Code of the first stop condition that has stopped.
    pub fn stop_code(&self) -> StopCode {
        self.scheduler.stop_code()
    }

    /// The deadline registered for `end_time`.
    pub fn deadline(&self) -> Option<&Shared<Deadline>> {
        self.deadline.as_ref()
    }

    /// The reporter registered for `report_interval`.
    pub fn reporter(&self) -> Option<&Shared<Periodic<TimeReporter>>> {
        self.reporter.as_ref()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
