//! Name-keyed value registry, binary snapshots and frame recording.
//!
//! Components publish [`Signal`](simloop_core::Signal) handles into a
//! shared [`Registry`] under flat, dotted names. The registry can then
//! capture every plain-old-data value into a binary snapshot, restore
//! values from one, and render all entries as JSON. A [`Recorder`]
//! captures the registry at its own cadence during a run, and its frames
//! persist as a simple log that [`FrameReader`] reads back.
//!
//! # Formats
//!
//! ```text
//! snapshot: { [u32 name_len] [name] [u32 data_size] [data] }*
//! log:      { [f64 time] [u64 payload_size] [payload] }*
//! ```
//!
//! All fields are little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod recorder;
pub mod registry;
pub mod value;

pub use error::RegistryError;
pub use reader::{FrameIter, FrameReader};
pub use recorder::{RecordedFrame, Recorder};
pub use registry::{EntryInfo, Registry, RestoreReport};
pub use value::{Pod, RegistryEntry};
