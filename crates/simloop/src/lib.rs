//! simloop: a deterministic fixed-timestep simulation loop.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! simloop sub-crates. For most users, adding `simloop` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use simloop::prelude::*;
//!
//! // A component that counts its passes.
//! struct Counter(u32);
//! impl Component for Counter {
//!     fn init(&mut self, _t: f64) -> Result<(), ComponentError> { self.0 = 0; Ok(()) }
//!     fn exec(&mut self, _t: f64) -> Result<(), ComponentError> { self.0 += 1; Ok(()) }
//!     fn terminate(&mut self, _t: f64) -> Result<(), ComponentError> { Ok(()) }
//! }
//!
//! let mut sim = Simulation::new(SimulationConfig {
//!     step_size: 0.5,
//!     end_time: Some(2.0),
//!     ..Default::default()
//! })
//! .unwrap();
//! let counter = shared(Counter(0));
//! sim.add_component(counter.clone()).unwrap();
//! sim.run().unwrap();
//!
//! assert_eq!(counter.lock().0, 5);
//! assert_eq!(sim.stop_code(), StopCode::Ended);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `simloop-core` | Component/clock traits, `Periodic`, `Signal`, states, errors |
//! | [`clock`] | `simloop-clock` | Basic, synchronized and threaded real-time clocks |
//! | [`registry`] | `simloop-registry` | Value registry, snapshots, recorder and log reader |
//! | [`engine`] | `simloop-engine` | Scheduler, stop conditions, curves, simulation assembly |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core traits, shared values and errors (`simloop-core`).
///
/// Contains the [`types::Component`], [`types::PeriodicComponent`],
/// [`types::StopCondition`] and [`types::Clock`] contracts.
pub use simloop_core as types;

/// Clocks (`simloop-clock`).
///
/// [`clock::BasicClock`] for logical time, [`clock::SynchronizedClock`]
/// and [`clock::ThreadedClock`] for paced time.
pub use simloop_clock as clock;

/// Value registry and recording (`simloop-registry`).
///
/// Publish values into a [`registry::Registry`], capture them with a
/// [`registry::Recorder`], read logs back with [`registry::FrameReader`].
pub use simloop_registry as registry;

/// The execution loop (`simloop-engine`).
pub use simloop_engine as engine;

/// Common imports for typical simloop usage.
///
/// ```rust
/// use simloop::prelude::*;
/// ```
pub mod prelude {
    // Core traits and values
    pub use simloop_core::{
        shared, Clock, Component, LoopState, Periodic, PeriodicComponent, Shared, Signal,
        StopCode, StopCondition, StopState,
    };

    // Errors
    pub use simloop_core::{ClockError, ComponentError, DomainError, LifecycleError, SetupError};

    // Clocks
    pub use simloop_clock::{BasicClock, RealTimeClock, SynchronizedClock};

    // Registry
    pub use simloop_registry::{Recorder, Registry, RegistryError};

    // Engine
    pub use simloop_engine::{
        Deadline, EnvelopeViolation, FnComponent, LoopError, Scheduler, SignalCurve, SignalTube,
        Simulation, SimulationConfig, StopIf, ThresholdExceed, TimeReporter,
    };
}
