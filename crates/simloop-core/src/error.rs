//! Error types for the simloop scheduler.
//!
//! Organized by the failure taxonomy of the loop: setup (configuration
//! detected eagerly), lifecycle (operation called from the wrong state),
//! domain (evaluation outside a defined range), clock, and component
//! hook failures.

use thiserror::Error;

use crate::state::LoopState;

/// Configuration problems detected at `add_*` or `initialize` time.
///
/// Not recoverable by retrying: the caller must fix the configuration
/// and call `initialize` again.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SetupError {
    /// `initialize` was called before a clock was set.
    #[error("a clock must be set before the loop is initialized")]
    MissingClock,
    /// The same component handle was registered twice.
    #[error("component is already registered (index {index})")]
    DuplicateComponent {
        /// Registration index of the existing entry.
        index: usize,
    },
    /// The same stop condition handle was registered twice.
    #[error("stop condition is already registered (index {index})")]
    DuplicateStopCondition {
        /// Registration index of the existing entry.
        index: usize,
    },
    /// A step size is zero, negative, or not finite.
    #[error("step size must be finite and positive, got {value}")]
    InvalidStepSize {
        /// The rejected step size.
        value: f64,
    },
    /// A curve definition is malformed (length mismatch, non-increasing x).
    #[error("malformed curve: {reason}")]
    MalformedCurve {
        /// Description of the defect.
        reason: String,
    },
    /// A curve needed at initialization has fewer than two points.
    #[error("{which} curve is not set (needs at least two points)")]
    CurveNotSet {
        /// Which curve (e.g. `"lower"`, `"upper"`).
        which: &'static str,
    },
    /// A named parameter has an invalid value.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// An operation was called while the loop was in a state that does not
/// allow it. The loop state is left unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// `operation` requires `expected`, but the loop is in `actual`.
    #[error("`{operation}` requires the loop to be {expected}, but it is {actual}")]
    InvalidState {
        /// Name of the rejected operation.
        operation: &'static str,
        /// The state the operation requires.
        expected: LoopState,
        /// The state the loop was actually in.
        actual: LoopState,
    },
}

/// Evaluation outside a defined domain.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum DomainError {
    /// `x` lies outside `[min, max]` by more than the distance tolerance.
    #[error("x = {x} is outside the curve domain [{min}, {max}]")]
    OutOfRange {
        /// The requested abscissa.
        x: f64,
        /// Smallest defined abscissa.
        min: f64,
        /// Largest defined abscissa.
        max: f64,
    },
    /// The curve has fewer than two points.
    #[error("curve has fewer than two points")]
    CurveNotSet,
}

/// Errors raised by clocks.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClockError {
    /// `step()` was called on a paced clock before `start()`.
    #[error("clock stepped before it was started")]
    NotStarted,
    /// `start()` was called on a clock that is already running.
    #[error("clock is already running")]
    AlreadyRunning,
    /// The clock's background worker could not be spawned.
    #[error("failed to spawn clock worker: {reason}")]
    ThreadSpawnFailed {
        /// OS error description.
        reason: String,
    },
    /// The clock's background worker panicked before it was joined.
    #[error("clock worker panicked")]
    WorkerPanicked,
    /// The time source closed before the reference time reached the
    /// next tick.
    #[error("time source closed before the next tick was due")]
    SourceClosed,
}

/// Failure reported by a component hook.
///
/// Returned by [`Component`](crate::Component) and
/// [`PeriodicComponent`](crate::PeriodicComponent) hooks and wrapped
/// with the component index by the scheduler.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ComponentError {
    /// The hook failed for a component-specific reason.
    #[error("component failed: {reason}")]
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The component is misconfigured.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The component evaluated something outside its domain.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
