//! Fixed-timestep execution loop for simloop.
//!
//! [`Scheduler`] drives registered components through
//! `initialize → execute → terminate` against a clock, polling stop
//! conditions after every pass. This crate also provides the built-in
//! stop conditions ([`Deadline`], [`ThresholdExceed`], [`StopIf`],
//! [`EnvelopeViolation`]), the piecewise-linear [`SignalCurve`] and
//! [`SignalTube`] they evaluate, closure-based components
//! ([`FnComponent`]), a progress [`TimeReporter`], and the
//! config-driven [`Simulation`] assembly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod curve;
pub mod error;
pub mod generic;
pub mod reporter;
pub mod scheduler;
pub mod simulation;
pub mod stops;

pub use config::SimulationConfig;
pub use curve::{SignalCurve, SignalTube};
pub use error::{ConfigError, Hook, LoopError};
pub use generic::FnComponent;
pub use reporter::{TimeReporter, DEFAULT_REPORT_INTERVAL};
pub use scheduler::{AbortHandle, Scheduler};
pub use simulation::Simulation;
pub use stops::{Deadline, EnvelopeViolation, StopIf, ThresholdExceed};
