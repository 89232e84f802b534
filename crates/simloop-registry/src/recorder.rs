//! Periodic capture of registry snapshots into time-stamped frames.

use std::io::Write;
use std::sync::Arc;

use simloop_core::{ComponentError, Periodic, PeriodicComponent};
use tracing::debug;

use crate::codec::encode_frame;
use crate::error::RegistryError;
use crate::registry::{Registry, RestoreReport};

/// One captured snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedFrame {
    /// Simulation time of the capture.
    pub time: f64,
    /// The registry snapshot.
    pub payload: Vec<u8>,
}

/// Captures the registry on every scheduled step.
///
/// Wrap it in [`Periodic`] (or use [`Recorder::periodic`]) to register it
/// with a scheduler. Frames accumulate in capture order and are cleared at
/// every `init`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use simloop_core::{Component, Signal};
/// use simloop_registry::{Recorder, Registry};
///
/// let registry = Arc::new(Registry::new());
/// let x = Signal::new(0.0_f64);
/// registry.publish("x", &x);
///
/// let mut rec = Recorder::periodic(Arc::clone(&registry), 1.0);
/// rec.init(0.0).unwrap();
/// for t in [0.0, 1.0, 2.0] {
///     x.set(t * 10.0);
///     if rec.exec_condition(t) {
///         rec.exec(t).unwrap();
///     }
/// }
/// assert_eq!(rec.inner().frame_count(), 3);
///
/// let mut log = Vec::new();
/// rec.inner().write_to(&mut log).unwrap();
/// assert_eq!(log.len(), 3 * (8 + 8 + 4 + 1 + 4 + 8));
/// ```
#[derive(Debug)]
pub struct Recorder {
    registry: Arc<Registry>,
    frames: Vec<RecordedFrame>,
}

impl Recorder {
    /// A recorder capturing `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            frames: Vec::new(),
        }
    }

    /// A recorder already wrapped for periodic execution.
    pub fn periodic(registry: Arc<Registry>, time_step_size: f64) -> Periodic<Self> {
        Periodic::new(Self::new(registry), time_step_size)
    }

    /// The captured registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Number of frames captured since the last init.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame `index`, if captured.
    pub fn frame(&self, index: usize) -> Option<&RecordedFrame> {
        self.frames.get(index)
    }

    /// All frames in capture order.
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Serialize every frame as `[f64 time][u64 size][payload]`.
    pub fn write_to(&self, w: &mut dyn Write) -> Result<(), RegistryError> {
        for frame in &self.frames {
            encode_frame(w, frame.time, &frame.payload)?;
        }
        Ok(())
    }

    /// Restore frame `index` into the registry.
    pub fn replay_into(&self, index: usize) -> Result<RestoreReport, RegistryError> {
        let frame = self
            .frames
            .get(index)
            .ok_or(RegistryError::FrameOutOfRange {
                index,
                len: self.frames.len(),
            })?;
        self.registry.restore(&frame.payload)
    }
}

impl PeriodicComponent for Recorder {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        self.frames.clear();
        debug!(time, entries = self.registry.len(), "recorder initialized");
        Ok(())
    }

    fn step(&mut self, time: f64, _delta_time: f64) -> Result<(), ComponentError> {
        self.frames.push(RecordedFrame {
            time,
            payload: self.registry.capture(),
        });
        Ok(())
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        debug!(time, frames = self.frames.len(), "recorder terminated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simloop_core::{Component, Signal};

    fn setup() -> (Arc<Registry>, Signal<f64>, Periodic<Recorder>) {
        let registry = Arc::new(Registry::new());
        let x = Signal::new(0.0);
        registry.publish("x", &x);
        let rec = Recorder::periodic(Arc::clone(&registry), 0.5);
        (registry, x, rec)
    }

    fn drive(rec: &mut Periodic<Recorder>, x: &Signal<f64>, ticks: u32) {
        for i in 0..ticks {
            let t = i as f64 * 0.25;
            x.set(t);
            if rec.exec_condition(t) {
                rec.exec(t).unwrap();
            }
        }
    }

    #[test]
    fn captures_on_own_cadence() {
        let (_reg, x, mut rec) = setup();
        rec.init(0.0).unwrap();
        drive(&mut rec, &x, 8);
        let times: Vec<f64> = rec.inner().frames().iter().map(|f| f.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn init_clears_frames() {
        let (_reg, x, mut rec) = setup();
        rec.init(0.0).unwrap();
        drive(&mut rec, &x, 4);
        assert_eq!(rec.inner().frame_count(), 2);
        rec.init(0.0).unwrap();
        assert_eq!(rec.inner().frame_count(), 0);
    }

    #[test]
    fn replay_restores_a_frame() {
        let (_reg, x, mut rec) = setup();
        rec.init(0.0).unwrap();
        drive(&mut rec, &x, 8);
        rec.inner().replay_into(1).unwrap();
        assert_eq!(x.get(), 0.5);
        assert!(matches!(
            rec.inner().replay_into(10),
            Err(RegistryError::FrameOutOfRange { index: 10, len: 4 })
        ));
    }

    #[test]
    fn log_is_time_size_payload_triples() {
        let (_reg, x, mut rec) = setup();
        rec.init(0.0).unwrap();
        drive(&mut rec, &x, 3);
        let mut log = Vec::new();
        rec.inner().write_to(&mut log).unwrap();

        let first = &rec.inner().frames()[0];
        let n = first.payload.len();
        assert_eq!(&log[..8], &0.0f64.to_le_bytes());
        assert_eq!(&log[8..16], &(n as u64).to_le_bytes());
        assert_eq!(&log[16..16 + n], first.payload.as_slice());
        assert_eq!(&log[16 + n..24 + n], &0.5f64.to_le_bytes());
    }
}
