//! Test utilities and fixture components for simloop development.
//!
//! Provides recording and failing implementations of the core traits
//! (`Component`, `PeriodicComponent`, `StopCondition`) so loop
//! behavior can be asserted without a real model.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingComponent, FailingComponent, ManualStop, PassLimit, StepLog};

