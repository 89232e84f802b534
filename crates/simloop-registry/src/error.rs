//! Error types for the registry, snapshot codec and frame log.

use std::io;

use thiserror::Error;

/// Errors raised by [`Registry`](crate::Registry) lookups, snapshot
/// restore, and frame-log I/O.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No entry is published under `name`.
    #[error("no registry entry named \"{name}\"")]
    NotFound {
        /// The requested name.
        name: String,
    },
    /// The entry exists but holds a different type.
    #[error("registry entry \"{name}\" holds {found}, not {expected}")]
    TypeMismatch {
        /// The requested name.
        name: String,
        /// Type the caller asked for.
        expected: &'static str,
        /// Type the entry was published with.
        found: &'static str,
    },
    /// A snapshot buffer ends in the middle of a record.
    #[error("snapshot truncated at byte {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        /// Offset of the field that could not be read.
        offset: usize,
        /// Bytes the field needs.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },
    /// A frame in a recorded log could not be decoded.
    #[error("malformed frame {index}: {detail}")]
    MalformedFrame {
        /// Zero-based index of the frame in the log.
        index: u64,
        /// What went wrong.
        detail: String,
    },
    /// A frame index past the end of the recording.
    #[error("frame {index} out of range (recording has {len} frames)")]
    FrameOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of recorded frames.
        len: usize,
    },
    /// JSON projection failed to serialize.
    #[error("JSON projection failed: {0}")]
    Json(#[from] serde_json::Error),
    /// An I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
