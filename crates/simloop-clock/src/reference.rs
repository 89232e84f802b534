//! Single-producer / single-consumer reference-time cell.
//!
//! The reference time is an `f64` stored as its bit pattern in an
//! `AtomicU64`, so a reader never observes a torn value. The producer end
//! ([`ReferenceTimeWriter`]) is not `Clone`: there is exactly one writer
//! per cell, owned either by the synchronized clock itself or by the
//! worker thread that paces it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Cell {
    bits: AtomicU64,
}

/// Create a connected writer/reader pair, initialized to `0.0`.
///
/// # Examples
///
/// ```
/// let (writer, reader) = simloop_clock::reference_time();
/// writer.publish(1.25);
/// assert_eq!(reader.load(), 1.25);
/// ```
pub fn reference_time() -> (ReferenceTimeWriter, ReferenceTimeReader) {
    let cell = Arc::new(Cell {
        bits: AtomicU64::new(0.0f64.to_bits()),
    });
    (
        ReferenceTimeWriter {
            cell: Arc::clone(&cell),
        },
        ReferenceTimeReader { cell },
    )
}

/// Producer end of a reference-time cell.
#[derive(Debug)]
pub struct ReferenceTimeWriter {
    cell: Arc<Cell>,
}

impl ReferenceTimeWriter {
    /// Publish a new reference time.
    pub fn publish(&self, time: f64) {
        self.cell.bits.store(time.to_bits(), Ordering::Release);
    }
}

/// Consumer end of a reference-time cell.
#[derive(Debug)]
pub struct ReferenceTimeReader {
    cell: Arc<Cell>,
}

impl ReferenceTimeReader {
    /// Read the latest published reference time.
    pub fn load(&self) -> f64 {
        f64::from_bits(self.cell.bits.load(Ordering::Acquire))
    }

    /// Rebuild the producer end for this cell.
    ///
    /// Only used to recover a clock whose writer was lost (a worker thread
    /// that failed to spawn consumed it), which keeps the single-writer
    /// invariant: the old writer no longer exists.
    pub(crate) fn rebind_writer(&self) -> ReferenceTimeWriter {
        ReferenceTimeWriter {
            cell: Arc::clone(&self.cell),
        }
    }
}

// Compile-time assertion: both ends can cross thread boundaries.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ReferenceTimeWriter>();
    assert::<ReferenceTimeReader>();
};
