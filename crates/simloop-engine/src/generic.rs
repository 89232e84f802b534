//! Periodic components assembled from closures.

use std::fmt;

use simloop_core::{ComponentError, Periodic, PeriodicComponent};

type InitFn = Box<dyn FnMut(f64) -> Result<(), ComponentError> + Send>;
type StepFn = Box<dyn FnMut(f64, f64) -> Result<(), ComponentError> + Send>;

/// A [`PeriodicComponent`] whose hooks are optional closures.
///
/// Missing hooks do nothing.
///
/// # Examples
///
/// ```
/// use simloop_core::{Component, Signal};
/// use simloop_engine::FnComponent;
///
/// let position = Signal::new(0.0_f64);
/// let p = position.clone();
/// let mut integrator = FnComponent::new()
///     .on_step(move |_t, dt| {
///         p.update(|x| *x += 2.0 * dt);
///         Ok(())
///     })
///     .periodic(0.5);
///
/// integrator.init(0.0).unwrap();
/// for t in [0.0, 0.5, 1.0] {
///     if integrator.exec_condition(t) {
///         integrator.exec(t).unwrap();
///     }
/// }
/// assert_eq!(position.get(), 2.0);
/// ```
#[derive(Default)]
pub struct FnComponent {
    init: Option<InitFn>,
    step: Option<StepFn>,
    terminate: Option<InitFn>,
}

impl FnComponent {
    /// A component with no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` at init.
    pub fn on_init<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64) -> Result<(), ComponentError> + Send + 'static,
    {
        self.init = Some(Box::new(f));
        self
    }

    /// Run `f(time, delta_time)` at every scheduled step.
    pub fn on_step<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64, f64) -> Result<(), ComponentError> + Send + 'static,
    {
        self.step = Some(Box::new(f));
        self
    }

    /// Run `f` at terminate.
    pub fn on_terminate<F>(mut self, f: F) -> Self
    where
        F: FnMut(f64) -> Result<(), ComponentError> + Send + 'static,
    {
        self.terminate = Some(Box::new(f));
        self
    }

    /// Wrap for execution every `time_step_size`.
    pub fn periodic(self, time_step_size: f64) -> Periodic<Self> {
        Periodic::new(self, time_step_size)
    }
}

impl PeriodicComponent for FnComponent {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        self.init.as_mut().map_or(Ok(()), |f| f(time))
    }

    fn step(&mut self, time: f64, delta_time: f64) -> Result<(), ComponentError> {
        self.step.as_mut().map_or(Ok(()), |f| f(time, delta_time))
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        self.terminate.as_mut().map_or(Ok(()), |f| f(time))
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent")
            .field("init", &self.init.is_some())
            .field("step", &self.step.is_some())
            .field("terminate", &self.terminate.is_some())
            .finish()
    }
}
