//! Error types for the execution loop and simulation assembly.

use std::fmt;

use simloop_core::{ClockError, ComponentError, LifecycleError, SetupError};
use thiserror::Error;

/// The component hook that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    /// `init`, called by `initialize`.
    Init,
    /// `exec`, called once per pass.
    Exec,
    /// `terminate`, called by `terminate`.
    Terminate,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Exec => write!(f, "exec"),
            Self::Terminate => write!(f, "terminate"),
        }
    }
}

/// Errors returned by [`Scheduler`](crate::Scheduler) operations.
#[derive(Debug, Error)]
pub enum LoopError {
    /// Configuration problem (missing clock, duplicate registration, ...).
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// Operation called from the wrong loop state.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    /// The clock failed to start, step or stop.
    #[error(transparent)]
    Clock(#[from] ClockError),
    /// The simulation configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A component hook returned an error.
    #[error("component {index} failed in {hook}: {source}")]
    Component {
        /// Registration index of the component.
        index: usize,
        /// The hook that failed.
        hook: Hook,
        /// The component's error.
        source: ComponentError,
    },
}

/// Errors detected by [`SimulationConfig::validate`](crate::SimulationConfig::validate).
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// `step_size` is zero, negative, or not finite.
    #[error("step_size must be finite and positive, got {value}")]
    InvalidStepSize {
        /// The rejected value.
        value: f64,
    },
    /// `start_time` is not finite.
    #[error("start_time must be finite, got {value}")]
    InvalidStartTime {
        /// The rejected value.
        value: f64,
    },
    /// `end_time` is not finite or lies before `start_time`.
    #[error("end_time {end} must be finite and not before start_time {start}")]
    InvalidEndTime {
        /// Configured start time.
        start: f64,
        /// The rejected end time.
        end: f64,
    },
    /// `acceleration` is zero, negative, or not finite.
    #[error("acceleration must be finite and positive, got {value}")]
    InvalidAcceleration {
        /// The rejected value.
        value: f64,
    },
    /// `report_interval` is zero, negative, or not finite.
    #[error("report_interval must be finite and positive, got {value}")]
    InvalidReportInterval {
        /// The rejected value.
        value: f64,
    },
    /// A validated value was still rejected while building the loop.
    #[error(transparent)]
    Setup(#[from] SetupError),
}
