//! Built-in stop conditions.
//!
//! Each condition here is both a [`Component`] (it evaluates in `exec`,
//! during the pass) and a [`StopCondition`] (the scheduler polls its code
//! after the pass). Register them with
//! [`Scheduler::add_stop_monitor`](crate::Scheduler::add_stop_monitor).

use simloop_core::{
    reached, Component, ComponentError, SetupError, Signal, StopCode, StopCondition, StopState,
};

use crate::curve::{SignalCurve, SignalTube};

// ── Deadline ────────────────────────────────────────────────────

/// Ends the run once loop time reaches a stop time.
///
/// Uses the same tolerance as [`Periodic`](simloop_core::Periodic), so a
/// deadline on the step grid fires on that tick despite accumulated
/// floating-point error.
#[derive(Clone, Debug)]
pub struct Deadline {
    stop_time: f64,
    state: StopState,
}

impl Deadline {
    /// Stop with [`StopCode::Ended`] once `time + eps >= stop_time`.
    pub fn new(stop_time: f64) -> Self {
        Self {
            stop_time,
            state: StopState::new(),
        }
    }

    /// Change the stop time. Takes effect on the next pass.
    pub fn set_stop_time(&mut self, stop_time: f64) {
        self.stop_time = stop_time;
    }

    /// Configured stop time.
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }
}

impl Component for Deadline {
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }

    fn exec(&mut self, time: f64) -> Result<(), ComponentError> {
        if reached(time, self.stop_time) {
            self.state.end();
        }
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }
}

impl StopCondition for Deadline {
    fn code(&self) -> StopCode {
        self.state.code()
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

// ── Threshold ───────────────────────────────────────────────────

/// Stops when a shared value strictly exceeds a limit.
///
/// # Examples
///
/// ```
/// use simloop_core::{Component, Signal, StopCode, StopCondition};
/// use simloop_engine::ThresholdExceed;
///
/// let temperature = Signal::new(20.0_f64);
/// let mut stop = ThresholdExceed::new(temperature.clone(), 90.0);
/// stop.exec(0.0).unwrap();
/// assert_eq!(stop.code(), StopCode::None);
///
/// temperature.set(90.5);
/// stop.exec(1.0).unwrap();
/// assert_eq!(stop.code(), StopCode::Ended);
/// ```
#[derive(Debug)]
pub struct ThresholdExceed<T> {
    value: Signal<T>,
    limit: T,
    mode: StopCode,
    state: StopState,
}

impl<T> ThresholdExceed<T>
where
    T: PartialOrd + Copy + Send + 'static,
{
    /// Watch `value`, stopping with [`StopCode::Ended`] once `value > limit`.
    pub fn new(value: Signal<T>, limit: T) -> Self {
        Self {
            value,
            limit,
            mode: StopCode::Ended,
            state: StopState::new(),
        }
    }

    /// Stop with `mode` instead of [`StopCode::Ended`].
    pub fn with_mode(mut self, mode: StopCode) -> Self {
        self.mode = mode;
        self
    }

    /// Change the stop code set when the limit is exceeded.
    pub fn set_mode(&mut self, mode: StopCode) {
        self.mode = mode;
    }

    /// Change the limit. Clears a code set under the previous limit.
    pub fn set_limit(&mut self, limit: T) {
        self.limit = limit;
        self.state.reset();
    }

    /// Configured limit.
    pub fn limit(&self) -> T {
        self.limit
    }

    /// Stop code set when the limit is exceeded.
    pub fn mode(&self) -> StopCode {
        self.mode
    }

    /// The watched value.
    pub fn value(&self) -> &Signal<T> {
        &self.value
    }
}

impl<T> Component for ThresholdExceed<T>
where
    T: PartialOrd + Copy + Send + 'static,
{
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }

    fn exec(&mut self, _time: f64) -> Result<(), ComponentError> {
        if self.value.get() > self.limit {
            self.state.stop(self.mode);
        }
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }
}

impl<T> StopCondition for ThresholdExceed<T>
where
    T: PartialOrd + Copy + Send + 'static,
{
    fn code(&self) -> StopCode {
        self.state.code()
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

/// Stops as soon as a flag becomes `true`.
pub type StopIf = ThresholdExceed<bool>;

impl ThresholdExceed<bool> {
    /// Stop with [`StopCode::Ended`] once `flag` is `true`.
    pub fn stop_if(flag: Signal<bool>) -> Self {
        Self::new(flag, false)
    }
}

// ── Envelope ────────────────────────────────────────────────────

/// Stops when a trajectory `(x, y)` leaves a band between two curves.
///
/// Both curves must have at least two samples by `init`. The band is
/// closed: `y` exactly on a boundary is inside.
#[derive(Debug)]
pub struct EnvelopeViolation {
    x: Signal<f64>,
    y: Signal<f64>,
    tube: SignalTube,
    mode: StopCode,
    state: StopState,
}

impl EnvelopeViolation {
    /// Watch `(x, y)` against `tube`, stopping with
    /// [`StopCode::ObjectivesMissed`] on a violation.
    pub fn new(x: Signal<f64>, y: Signal<f64>, tube: SignalTube) -> Self {
        Self {
            x,
            y,
            tube,
            mode: StopCode::ObjectivesMissed,
            state: StopState::new(),
        }
    }

    /// Stop with `mode` instead of [`StopCode::ObjectivesMissed`].
    pub fn with_mode(mut self, mode: StopCode) -> Self {
        self.mode = mode;
        self
    }

    /// Replace the lower boundary.
    pub fn set_lower(&mut self, lower: SignalCurve) {
        self.tube.set_lower(lower);
    }

    /// Replace the upper boundary.
    pub fn set_upper(&mut self, upper: SignalCurve) {
        self.tube.set_upper(upper);
    }

    /// The band.
    pub fn tube(&self) -> &SignalTube {
        &self.tube
    }
}

impl Component for EnvelopeViolation {
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        if !self.tube.lower().is_set() {
            return Err(SetupError::CurveNotSet { which: "lower" }.into());
        }
        if !self.tube.upper().is_set() {
            return Err(SetupError::CurveNotSet { which: "upper" }.into());
        }
        Ok(())
    }

    fn exec(&mut self, _time: f64) -> Result<(), ComponentError> {
        if !self.tube.contains(self.x.get(), self.y.get()) {
            self.state.stop(self.mode);
        }
        Ok(())
    }

    fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
        Ok(())
    }
}

impl StopCondition for EnvelopeViolation {
    fn code(&self) -> StopCode {
        self.state.code()
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}
