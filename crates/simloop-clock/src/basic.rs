//! Logical clock advanced by fixed increments.

use simloop_core::{Clock, ClockError, SetupError};

/// Logical clock: every `step()` adds the step size, unconditionally.
///
/// `start()`/`stop()` only track the running flag; they never block.
///
/// # Examples
///
/// ```
/// use simloop_clock::BasicClock;
/// use simloop_core::Clock;
///
/// let mut clock = BasicClock::new(0.5).unwrap().with_start_time(1.0);
/// clock.reset();
/// clock.step().unwrap();
/// clock.step().unwrap();
/// assert_eq!(clock.time(), 2.0);
/// ```
#[derive(Clone, Debug)]
pub struct BasicClock {
    time: f64,
    step_size: f64,
    start_time: f64,
    running: bool,
}

impl BasicClock {
    /// Create a clock with the given step size, starting at time 0.
    ///
    /// Fails if `step_size` is not finite and positive.
    pub fn new(step_size: f64) -> Result<Self, SetupError> {
        validate_step_size(step_size)?;
        Ok(Self {
            time: 0.0,
            step_size,
            start_time: 0.0,
            running: false,
        })
    }

    /// Builder form of [`set_start_time`](BasicClock::set_start_time).
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.set_start_time(start_time);
        self
    }

    /// Time the clock returns to on `reset()`.
    pub fn set_start_time(&mut self, start_time: f64) {
        self.start_time = start_time;
    }

    /// Change the step size.
    pub fn set_step_size(&mut self, step_size: f64) -> Result<(), SetupError> {
        validate_step_size(step_size)?;
        self.step_size = step_size;
        Ok(())
    }

    /// Configured start time.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Overwrite the logical time. Used by paced clocks.
    pub(crate) fn set_time(&mut self, time: f64) {
        self.time = time;
    }
}

pub(crate) fn validate_step_size(step_size: f64) -> Result<(), SetupError> {
    if step_size.is_finite() && step_size > 0.0 {
        Ok(())
    } else {
        Err(SetupError::InvalidStepSize { value: step_size })
    }
}

impl Clock for BasicClock {
    fn time(&self) -> f64 {
        self.time
    }

    fn step_size(&self) -> f64 {
        self.step_size
    }

    fn reset(&mut self) {
        self.time = self.start_time;
    }

    fn start(&mut self) -> Result<(), ClockError> {
        self.running = true;
        Ok(())
    }

    fn step(&mut self) -> Result<(), ClockError> {
        self.time += self.step_size;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ClockError> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}
