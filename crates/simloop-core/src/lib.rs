//! Core types and traits for the simloop scheduler.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! contracts the execution loop consumes ([`Component`],
//! [`PeriodicComponent`], [`StopCondition`], [`Clock`]), the fixed-cadence
//! [`Periodic`] wrapper, shared [`Signal`] values, the loop and stop-code
//! state machines, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod periodic;
pub mod signal;
pub mod state;
pub mod time;
pub mod traits;

pub use error::{ClockError, ComponentError, DomainError, LifecycleError, SetupError};
pub use periodic::Periodic;
pub use signal::Signal;
pub use state::{LoopState, StopCode, StopState};
pub use time::{reached, EPS_DISTANCE, EPS_SIM_TIME};
pub use traits::{shared, Clock, Component, PeriodicComponent, Shared, StopCondition};
