//! Clocks for the simloop scheduler.
//!
//! Three clocks share the [`Clock`](simloop_core::Clock) contract:
//!
//! - [`BasicClock`] adds a fixed increment per step and never blocks.
//! - [`SynchronizedClock`] blocks each step until a reference time,
//!   published through a single-writer atomic cell, reaches the next
//!   scheduled instant (optionally scaled by an acceleration factor).
//! - [`ThreadedClock`] runs one worker thread between `start()` and
//!   `stop()` that feeds the reference cell from a [`TimeSource`]:
//!   [`WallClock`] for real-time pacing ([`RealTimeClock`]) or
//!   [`ChannelTimeSource`] for updates pushed by another party.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod basic;
pub mod reference;
pub mod synchronized;
pub mod threaded;

pub use basic::BasicClock;
pub use reference::{reference_time, ReferenceTimeReader, ReferenceTimeWriter};
pub use synchronized::{SynchronizedClock, DEFAULT_POLL_INTERVAL};
pub use threaded::{ChannelTimeSource, RealTimeClock, ThreadedClock, TimeSource, WallClock};
