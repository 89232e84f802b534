//! The contracts the scheduler consumes: components, stop conditions and clocks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{ClockError, ComponentError};
use crate::state::StopCode;

/// Shared, lockable handle used for everything the scheduler references
/// but does not exclusively own.
///
/// A typed `Shared<C>` coerces to `Arc<Mutex<dyn Component>>` (and to
/// `Arc<Mutex<dyn StopCondition>>`), so the caller keeps typed access
/// after registration.
pub type Shared<T> = Arc<Mutex<T>>;

/// Wrap a value in a [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Arc::new(Mutex::new(value))
}

/// A schedulable unit with init / exec / terminate hooks.
///
/// The scheduler calls the hooks from a single thread, in registration
/// order, once per pass. A hook must not block on other components.
///
/// # Examples
///
/// ```
/// use simloop_core::{Component, ComponentError};
///
/// struct Ticker { count: u32 }
///
/// impl Component for Ticker {
///     fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
///         self.count = 0;
///         Ok(())
///     }
///     fn exec(&mut self, _time: f64) -> Result<(), ComponentError> {
///         self.count += 1;
///         Ok(())
///     }
///     fn terminate(&mut self, _time: f64) -> Result<(), ComponentError> {
///         Ok(())
///     }
/// }
///
/// let mut t = Ticker { count: 7 };
/// t.init(0.0).unwrap();
/// assert!(t.exec_condition(0.0));
/// t.exec(0.0).unwrap();
/// assert_eq!(t.count, 1);
/// ```
pub trait Component: Send {
    /// Called once by `initialize` with the clock's reset time.
    fn init(&mut self, time: f64) -> Result<(), ComponentError>;

    /// Whether [`exec`](Component::exec) should run at `time`. Default: always.
    fn exec_condition(&self, _time: f64) -> bool {
        true
    }

    /// Called once per pass when the exec condition holds.
    fn exec(&mut self, time: f64) -> Result<(), ComponentError>;

    /// Called once by `terminate` with the clock's final time.
    fn terminate(&mut self, time: f64) -> Result<(), ComponentError>;
}

/// A component executed at a fixed cadence.
///
/// Wrap it in [`Periodic`](crate::Periodic) to obtain a [`Component`].
pub trait PeriodicComponent: Send {
    /// Called by the wrapper's `init`, after the schedule is reset.
    fn init(&mut self, time: f64) -> Result<(), ComponentError>;

    /// One scheduled step. `delta_time` is the simulation time elapsed
    /// since the previous step (or since init for the first step).
    fn step(&mut self, time: f64, delta_time: f64) -> Result<(), ComponentError>;

    /// Called by the wrapper's `terminate`.
    fn terminate(&mut self, time: f64) -> Result<(), ComponentError>;
}

/// A predicate object with a terminal code, polled once per pass.
pub trait StopCondition: Send {
    /// The current code.
    fn code(&self) -> StopCode;

    /// Whether a terminal code is set.
    fn has_stopped(&self) -> bool {
        self.code() != StopCode::None
    }

    /// Reset to [`StopCode::None`]. Called at every loop `initialize`.
    fn reset(&mut self);
}

/// The time source the scheduler advances once per pass.
///
/// Each clock has its own `{Stopped, Running}` state driven by
/// [`start`](Clock::start) / [`stop`](Clock::stop), independent of the
/// loop's lifecycle.
pub trait Clock: Send {
    /// Current logical time.
    fn time(&self) -> f64;

    /// Logical increment per [`step`](Clock::step).
    fn step_size(&self) -> f64;

    /// Re-initialize logical time to the configured start time.
    fn reset(&mut self);

    /// Enter the running state.
    fn start(&mut self) -> Result<(), ClockError>;

    /// Advance by one tick. Paced clocks block until the tick is due.
    fn step(&mut self) -> Result<(), ClockError>;

    /// Leave the running state.
    fn stop(&mut self) -> Result<(), ClockError>;

    /// Whether the clock is between `start` and `stop`.
    fn is_running(&self) -> bool;
}
