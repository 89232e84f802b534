//! The fixed-timestep execution loop.
//!
//! [`Scheduler`] owns a clock and references components and stop
//! conditions through shared handles. One thread drives
//! `initialize → execute → terminate`; each pass runs every component
//! whose exec condition holds, in registration order, then polls every
//! stop condition, then advances the clock by one tick.
//!
//! Cancellation is cooperative: [`AbortHandle::abort`] (callable from a
//! component or another thread) raises a flag that the loop observes at
//! the next pass boundary.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use simloop_core::{
    Clock, Component, LifecycleError, LoopState, SetupError, Shared, StopCode, StopCondition,
};
use tracing::{debug, info, warn};

use crate::error::{Hook, LoopError};

/// Loop state and stop flag, shared with abort handles.
#[derive(Debug, Default)]
struct LoopControl {
    state: AtomicU8,
    stop: AtomicBool,
}

impl LoopControl {
    fn state(&self) -> LoopState {
        LoopState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: LoopState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn abort(&self) -> Result<(), LifecycleError> {
        self.state
            .compare_exchange(
                LoopState::Running as u8,
                LoopState::Stopped as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|actual| LifecycleError::InvalidState {
                operation: "abort",
                expected: LoopState::Running,
                actual: LoopState::from_u8(actual),
            })?;
        self.stop.store(true, Ordering::Release);
        warn!("loop abort requested");
        Ok(())
    }
}

/// Clonable handle that cancels a running loop at the next pass boundary.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    control: Arc<LoopControl>,
}

impl AbortHandle {
    /// Request cancellation. Fails unless the loop is `Running`.
    ///
    /// Marks the loop `Stopped` immediately; the pass in progress still
    /// completes and the clock is not advanced again.
    pub fn abort(&self) -> Result<(), LifecycleError> {
        self.control.abort()
    }

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        self.control.state()
    }
}

/// The execution loop.
///
/// # Examples
///
/// ```
/// use simloop_clock::BasicClock;
/// use simloop_core::{shared, Component, ComponentError, LoopState};
/// use simloop_engine::{Deadline, Scheduler};
///
/// struct Counter(u32);
///
/// impl Component for Counter {
///     fn init(&mut self, _t: f64) -> Result<(), ComponentError> { self.0 = 0; Ok(()) }
///     fn exec(&mut self, _t: f64) -> Result<(), ComponentError> { self.0 += 1; Ok(()) }
///     fn terminate(&mut self, _t: f64) -> Result<(), ComponentError> { Ok(()) }
/// }
///
/// let counter = shared(Counter(0));
/// let deadline = shared(Deadline::new(1.0));
///
/// let mut sched = Scheduler::new();
/// sched.set_clock(BasicClock::new(0.25).unwrap()).unwrap();
/// sched.add_component(counter.clone()).unwrap();
/// sched.add_stop_monitor(&deadline).unwrap();
/// sched.run().unwrap();
///
/// // Passes at t = 0, 0.25, 0.5, 0.75, 1.0.
/// assert_eq!(counter.lock().0, 5);
/// assert_eq!(sched.state(), LoopState::Stopped);
/// ```
pub struct Scheduler {
    clock: Option<Box<dyn Clock>>,
    components: Vec<Arc<Mutex<dyn Component>>>,
    stop_conditions: Vec<Arc<Mutex<dyn StopCondition>>>,
    control: Arc<LoopControl>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn data_ptr<T: ?Sized>(handle: &Arc<Mutex<T>>) -> *const () {
    Arc::as_ptr(handle) as *const ()
}

impl Scheduler {
    /// An empty, stopped loop with no clock.
    pub fn new() -> Self {
        Self {
            clock: None,
            components: Vec::new(),
            stop_conditions: Vec::new(),
            control: Arc::new(LoopControl::default()),
        }
    }

    // ── Configuration (only while Stopped) ──────────────────────

    fn require(&self, operation: &'static str, expected: LoopState) -> Result<(), LifecycleError> {
        let actual = self.control.state();
        if actual == expected {
            Ok(())
        } else {
            Err(LifecycleError::InvalidState {
                operation,
                expected,
                actual,
            })
        }
    }

    /// Set (or replace) the clock.
    pub fn set_clock<C: Clock + 'static>(&mut self, clock: C) -> Result<(), LoopError> {
        self.require("set_clock", LoopState::Stopped)?;
        self.clock = Some(Box::new(clock));
        Ok(())
    }

    /// Register a component. Components execute in registration order.
    ///
    /// Registering the same handle twice is a setup error.
    pub fn add_component(&mut self, component: Arc<Mutex<dyn Component>>) -> Result<(), LoopError> {
        self.require("add_component", LoopState::Stopped)?;
        let ptr = data_ptr(&component);
        if let Some(index) = self.components.iter().position(|c| data_ptr(c) == ptr) {
            return Err(SetupError::DuplicateComponent { index }.into());
        }
        self.components.push(component);
        Ok(())
    }

    /// Register a stop condition.
    ///
    /// Registering the same handle twice is a setup error.
    pub fn add_stop_condition(
        &mut self,
        condition: Arc<Mutex<dyn StopCondition>>,
    ) -> Result<(), LoopError> {
        self.require("add_stop_condition", LoopState::Stopped)?;
        let ptr = data_ptr(&condition);
        if let Some(index) = self.stop_conditions.iter().position(|c| data_ptr(c) == ptr) {
            return Err(SetupError::DuplicateStopCondition { index }.into());
        }
        self.stop_conditions.push(condition);
        Ok(())
    }

    /// Register an object that is both a component and a stop condition.
    pub fn add_stop_monitor<M>(&mut self, monitor: &Shared<M>) -> Result<(), LoopError>
    where
        M: Component + StopCondition + 'static,
    {
        self.add_component(monitor.clone())?;
        if let Err(e) = self.add_stop_condition(monitor.clone()) {
            self.components.pop();
            return Err(e);
        }
        Ok(())
    }

    // ── Inspection ──────────────────────────────────────────────

    /// Current loop state.
    pub fn state(&self) -> LoopState {
        self.control.state()
    }

    /// A handle that can abort this loop from a component or another thread.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            control: Arc::clone(&self.control),
        }
    }

    /// The clock, if set.
    pub fn clock(&self) -> Option<&dyn Clock> {
        self.clock.as_deref()
    }

    /// Current clock time, if a clock is set.
    pub fn time(&self) -> Option<f64> {
        self.clock.as_ref().map(|c| c.time())
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered stop conditions.
    pub fn stop_condition_count(&self) -> usize {
        self.stop_conditions.len()
    }

    /// Code of the first stop condition (in registration order) that has
    /// stopped, or [`StopCode::None`].
    pub fn stop_code(&self) -> StopCode {
        self.stop_conditions
            .iter()
            .map(|sc| sc.lock().code())
            .find(|code| *code != StopCode::None)
            .unwrap_or(StopCode::None)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// `Stopped → Initialized`: reset the clock and the stop conditions,
    /// then init every component with the reset time.
    ///
    /// On failure the loop stays `Stopped`.
    pub fn initialize(&mut self) -> Result<(), LoopError> {
        self.require("initialize", LoopState::Stopped)?;
        let clock = self.clock.as_mut().ok_or(SetupError::MissingClock)?;

        clock.reset();
        for sc in &self.stop_conditions {
            sc.lock().reset();
        }

        let time = clock.time();
        for (index, component) in self.components.iter().enumerate() {
            component
                .lock()
                .init(time)
                .map_err(|source| LoopError::Component {
                    index,
                    hook: Hook::Init,
                    source,
                })?;
        }

        self.control.stop.store(false, Ordering::Release);
        self.control.set_state(LoopState::Initialized);
        debug!(
            time,
            components = self.components.len(),
            stop_conditions = self.stop_conditions.len(),
            "loop initialized"
        );
        Ok(())
    }

    /// `Initialized → Running`: start the clock and run passes until the
    /// stop flag is set, then stop the clock.
    ///
    /// The loop stays `Running` afterwards (unless aborted) until
    /// [`terminate`](Scheduler::terminate). A failing component hook ends
    /// the run early with that error.
    pub fn execute(&mut self) -> Result<(), LoopError> {
        self.require("execute", LoopState::Initialized)?;
        let clock = self.clock.as_mut().ok_or(SetupError::MissingClock)?;
        clock.start()?;
        self.control.set_state(LoopState::Running);
        self.run_clocked()
    }

    /// Initialize, execute and terminate.
    ///
    /// `terminate` runs even when `execute` fails; the first error is
    /// returned. Called while already `Running` (after an earlier
    /// `execute` that has not been terminated), it only runs passes.
    pub fn run(&mut self) -> Result<(), LoopError> {
        if self.state() == LoopState::Running {
            let clock = self.clock.as_mut().ok_or(SetupError::MissingClock)?;
            if !clock.is_running() {
                clock.start()?;
            }
            return self.run_clocked();
        }

        self.initialize()?;
        let executed = self.execute();
        let terminated = self.terminate();
        executed.and(terminated)
    }

    /// Terminate every component with the clock's current time, then mark
    /// the loop `Stopped`.
    ///
    /// Every hook runs even if an earlier one fails; the first error is
    /// returned.
    pub fn terminate(&mut self) -> Result<(), LoopError> {
        let time = self.time().unwrap_or(0.0);
        let mut first_error = None;
        for (index, component) in self.components.iter().enumerate() {
            if let Err(source) = component.lock().terminate(time) {
                first_error.get_or_insert(LoopError::Component {
                    index,
                    hook: Hook::Terminate,
                    source,
                });
            }
        }
        self.control.set_state(LoopState::Stopped);
        debug!(time, "loop terminated");
        first_error.map_or(Ok(()), Err)
    }

    /// Cancel a running loop at the next pass boundary. Fails unless
    /// `Running`. See [`AbortHandle::abort`].
    pub fn abort(&self) -> Result<(), LoopError> {
        self.control.abort()?;
        Ok(())
    }

    // ── Loop body ───────────────────────────────────────────────

    fn run_clocked(&mut self) -> Result<(), LoopError> {
        let passes = self.run_passes();
        let stopped = match self.clock.as_mut() {
            Some(clock) => clock.stop().map_err(LoopError::from),
            None => Ok(()),
        };
        passes.and(stopped)
    }

    fn run_passes(&mut self) -> Result<(), LoopError> {
        let Some(clock) = self.clock.as_mut() else {
            return Err(SetupError::MissingClock.into());
        };

        while !self.control.stop.load(Ordering::Acquire) {
            let time = clock.time();

            for (index, component) in self.components.iter().enumerate() {
                let mut component = component.lock();
                if component.exec_condition(time) {
                    component.exec(time).map_err(|source| LoopError::Component {
                        index,
                        hook: Hook::Exec,
                        source,
                    })?;
                }
            }

            for (index, sc) in self.stop_conditions.iter().enumerate() {
                let code = sc.lock().code();
                if code != StopCode::None {
                    info!(time, index, %code, "stop condition reached");
                    self.control.stop.store(true, Ordering::Release);
                }
            }

            if !self.control.stop.load(Ordering::Acquire) {
                clock.step()?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .field("time", &self.time())
            .field("components", &self.components.len())
            .field("stop_conditions", &self.stop_conditions.len())
            .finish()
    }
}
