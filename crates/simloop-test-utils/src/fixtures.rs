//! Fixture components.

use simloop_core::{
    Component, ComponentError, PeriodicComponent, StopCode, StopCondition, StopState,
};

/// Periodic component recording every `(time, delta_time)` it is stepped with.
#[derive(Clone, Debug, Default)]
pub struct StepLog {
    pub inits: Vec<f64>,
    pub steps: Vec<(f64, f64)>,
    pub terms: Vec<f64>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times of every step, in order.
    pub fn times(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.0).collect()
    }
}

impl PeriodicComponent for StepLog {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        self.inits.push(time);
        self.steps.clear();
        Ok(())
    }

    fn step(&mut self, time: f64, delta_time: f64) -> Result<(), ComponentError> {
        self.steps.push((time, delta_time));
        Ok(())
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        self.terms.push(time);
        Ok(())
    }
}

/// Component counting its hook calls. `execs` restarts at every init.
#[derive(Clone, Debug, Default)]
pub struct CountingComponent {
    pub inits: u32,
    pub execs: u32,
    pub terminates: u32,
    pub last_time: Option<f64>,
}

impl Component for CountingComponent {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        self.inits += 1;
        self.execs = 0;
        self.last_time = Some(time);
        Ok(())
    }

    fn exec(&mut self, time: f64) -> Result<(), ComponentError> {
        self.execs += 1;
        self.last_time = Some(time);
        Ok(())
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        self.terminates += 1;
        self.last_time = Some(time);
        Ok(())
    }
}

/// Component that fails in a chosen hook.
#[derive(Clone, Debug)]
pub struct FailingComponent {
    fail_init: bool,
    fail_exec_at: Option<u32>,
    fail_terminate: bool,
    reason: String,
    execs: u32,
}

impl FailingComponent {
    fn new(reason: &str) -> Self {
        Self {
            fail_init: false,
            fail_exec_at: None,
            fail_terminate: false,
            reason: reason.to_string(),
            execs: 0,
        }
    }

    /// Fails in `init`.
    pub fn on_init(reason: &str) -> Self {
        Self {
            fail_init: true,
            ..Self::new(reason)
        }
    }

    /// Fails on the `n`-th exec (1-based) after init.
    pub fn on_exec(n: u32, reason: &str) -> Self {
        Self {
            fail_exec_at: Some(n),
            ..Self::new(reason)
        }
    }

    /// Fails in `terminate`.
    pub fn on_terminate(reason: &str) -> Self {
        Self {
            fail_terminate: true,
            ..Self::new(reason)
        }
    }

    fn fail(&self) -> Result<(), ComponentError> {
        Err(ComponentError::failed(self.reason.clone()))
    }
}

impl Component for FailingComponent {
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        self.execs = 0;
        if self.fail_init {
            return self.fail();
        }
        Ok(())
    }

    fn exec(&mut self, _time: f64) -> Result<(), ComponentError> {
        self.execs += 1;
        if self.fail_exec_at == Some(self.execs) {
            return self.fail();
        }
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        if self.fail_terminate {
            return self.fail();
        }
        Ok(())
    }
}

/// Stop condition set by hand.
#[derive(Clone, Debug, Default)]
pub struct ManualStop {
    state: StopState,
    pub resets: u32,
}

impl ManualStop {
    pub fn trigger(&mut self, code: StopCode) {
        self.state.stop(code);
    }
}

impl StopCondition for ManualStop {
    fn code(&self) -> StopCode {
        self.state.code()
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.state.reset();
    }
}

/// Component and stop condition that ends the run after `limit` passes.
#[derive(Clone, Debug)]
pub struct PassLimit {
    limit: u32,
    passes: u32,
    state: StopState,
}

impl PassLimit {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            passes: 0,
            state: StopState::new(),
        }
    }

    pub fn passes(&self) -> u32 {
        self.passes
    }
}

impl Component for PassLimit {
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        self.passes = 0;
        Ok(())
    }

    fn exec(&mut self, _time: f64) -> Result<(), ComponentError> {
        self.passes += 1;
        if self.passes >= self.limit {
            self.state.end();
        }
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }
}

impl StopCondition for PassLimit {
    fn code(&self) -> StopCode {
        self.state.code()
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
