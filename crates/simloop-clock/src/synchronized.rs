//! Clock paced by an externally published reference time.

use std::thread;
use std::time::Duration;

use simloop_core::{Clock, ClockError, SetupError};

use crate::basic::BasicClock;
use crate::reference::{reference_time, ReferenceTimeReader, ReferenceTimeWriter};

/// Default sleep between two reference-time polls inside `step()`.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_micros(10);

/// Logical clock whose `step()` blocks until a reference time catches up.
///
/// Tick `k` (counted from the last `reset`) is due at logical instant
/// `k * step_size`. `step()` polls the reference cell until
/// `(reference - reference_at_start) * acceleration` reaches that instant,
/// then sets the logical time to `start_time + k * step_size`. The logical
/// time therefore stays on the exact grid no matter how late the step
/// returns.
///
/// The reference time is written by a single producer: by default the
/// clock holds the writer itself ([`set_reference_time`]); a background
/// thread or remote peer can take it with [`take_writer`].
///
/// [`set_reference_time`]: SynchronizedClock::set_reference_time
/// [`take_writer`]: SynchronizedClock::take_writer
///
/// # Examples
///
/// ```
/// use simloop_clock::SynchronizedClock;
/// use simloop_core::Clock;
///
/// let mut clock = SynchronizedClock::new(0.5).unwrap();
/// clock.reset();
/// clock.start().unwrap();
/// clock.set_reference_time(0.5);
/// clock.step().unwrap();
/// assert_eq!(clock.time(), 0.5);
/// ```
#[derive(Debug)]
pub struct SynchronizedClock {
    base: BasicClock,
    reader: ReferenceTimeReader,
    writer: Option<ReferenceTimeWriter>,
    acceleration: f64,
    reference_at_start: f64,
    steps: u64,
    running: bool,
    poll_interval: Duration,
}

impl SynchronizedClock {
    /// Create a clock with its own reference-time cell.
    pub fn new(step_size: f64) -> Result<Self, SetupError> {
        let (writer, reader) = reference_time();
        let mut clock = Self::from_reader(step_size, reader)?;
        clock.writer = Some(writer);
        Ok(clock)
    }

    /// Create a clock reading an existing reference-time cell whose
    /// writer lives elsewhere.
    pub fn from_reader(step_size: f64, reader: ReferenceTimeReader) -> Result<Self, SetupError> {
        Ok(Self {
            base: BasicClock::new(step_size)?,
            reader,
            writer: None,
            acceleration: 1.0,
            reference_at_start: 0.0,
            steps: 0,
            running: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Builder form of [`set_start_time`](SynchronizedClock::set_start_time).
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.set_start_time(start_time);
        self
    }

    /// Builder form of [`set_acceleration`](SynchronizedClock::set_acceleration).
    pub fn with_acceleration(mut self, acceleration: f64) -> Result<Self, SetupError> {
        self.set_acceleration(acceleration)?;
        Ok(self)
    }

    /// Logical time the clock returns to on `reset()`.
    pub fn set_start_time(&mut self, start_time: f64) {
        self.base.set_start_time(start_time);
    }

    /// Configured start time.
    pub fn start_time(&self) -> f64 {
        self.base.start_time()
    }

    /// Logical seconds per reference second. Must be finite and positive.
    pub fn set_acceleration(&mut self, acceleration: f64) -> Result<(), SetupError> {
        if !acceleration.is_finite() || acceleration <= 0.0 {
            return Err(SetupError::InvalidParameter {
                name: "acceleration",
                reason: format!("must be finite and positive, got {acceleration}"),
            });
        }
        self.acceleration = acceleration;
        Ok(())
    }

    /// Configured acceleration factor.
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Sleep between two polls of the reference cell. Zero yields instead.
    pub fn set_poll_interval(&mut self, poll_interval: Duration) {
        self.poll_interval = poll_interval;
    }

    /// Configured poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Ticks taken since the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Accelerated reference time elapsed since `start()`.
    pub fn elapsed(&self) -> f64 {
        (self.reader.load() - self.reference_at_start) * self.acceleration
    }

    /// Latest published reference time.
    pub fn reference_time(&self) -> f64 {
        self.reader.load()
    }

    /// Publish a reference time through the writer this clock holds.
    ///
    /// Returns `false` (and publishes nothing) if the writer was taken.
    pub fn set_reference_time(&self, time: f64) -> bool {
        match &self.writer {
            Some(writer) => {
                writer.publish(time);
                true
            }
            None => false,
        }
    }

    /// Hand the writer to an external producer.
    ///
    /// Returns `None` if it was already taken.
    pub fn take_writer(&mut self) -> Option<ReferenceTimeWriter> {
        self.writer.take()
    }

    /// Give a writer for this clock's cell back.
    pub(crate) fn restore_writer(&mut self, writer: ReferenceTimeWriter) {
        self.writer = Some(writer);
    }

    /// Rebuild the writer after it was lost with a failed worker.
    pub(crate) fn recover_writer(&mut self) {
        if self.writer.is_none() {
            self.writer = Some(self.reader.rebind_writer());
        }
    }

    /// Take one tick, giving up once `producer_alive` reports false and
    /// the reference time is still short of the tick.
    ///
    /// Returns `Ok(false)` without advancing when it gives up.
    pub(crate) fn step_while(
        &mut self,
        mut producer_alive: impl FnMut() -> bool,
    ) -> Result<bool, ClockError> {
        if !self.running {
            return Err(ClockError::NotStarted);
        }

        let due = self.base.step_size() * (self.steps + 1) as f64;
        while self.elapsed() < due {
            if !producer_alive() {
                // The producer may have published on its way out.
                if self.elapsed() >= due {
                    break;
                }
                return Ok(false);
            }
            self.wait();
        }

        self.steps += 1;
        let time = due + self.base.start_time();
        self.base.set_time(time);
        Ok(true)
    }

    fn wait(&self) {
        if self.poll_interval.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.poll_interval);
        }
    }
}

impl Clock for SynchronizedClock {
    fn time(&self) -> f64 {
        self.base.time()
    }

    fn step_size(&self) -> f64 {
        self.base.step_size()
    }

    fn reset(&mut self) {
        self.steps = 0;
        self.base.reset();
        self.set_reference_time(0.0);
    }

    fn start(&mut self) -> Result<(), ClockError> {
        if self.running {
            return Err(ClockError::AlreadyRunning);
        }
        self.reference_at_start = self.reader.load();
        self.running = true;
        Ok(())
    }

    fn step(&mut self) -> Result<(), ClockError> {
        self.step_while(|| true).map(|_| ())
    }

    fn stop(&mut self) -> Result<(), ClockError> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn started(step: f64) -> SynchronizedClock {
        let mut c = SynchronizedClock::new(step).unwrap();
        c.set_poll_interval(Duration::ZERO);
        c.reset();
        c.start().unwrap();
        c
    }

    #[test]
    fn step_before_start_is_rejected() {
        let mut c = SynchronizedClock::new(0.1).unwrap();
        assert_eq!(c.step(), Err(ClockError::NotStarted));
        assert_eq!(c.steps(), 0);
    }

    #[test]
    fn double_start_is_rejected() {
        let mut c = started(0.1);
        assert_eq!(c.start(), Err(ClockError::AlreadyRunning));
        c.stop().unwrap();
        assert!(c.start().is_ok());
    }

    #[test]
    fn time_lands_on_the_grid_not_on_the_reference() {
        let mut c = started(0.1);
        // Reference well past the first two ticks.
        c.set_reference_time(0.234);
        c.step().unwrap();
        assert_eq!(c.time(), 0.1);
        c.step().unwrap();
        assert_eq!(c.time(), 0.1 * 2.0);
        assert_eq!(c.steps(), 2);
    }

    #[test]
    fn start_time_offsets_logical_time() {
        let mut c = SynchronizedClock::new(0.5).unwrap().with_start_time(10.0);
        c.set_poll_interval(Duration::ZERO);
        c.reset();
        assert_eq!(c.time(), 10.0);
        c.start().unwrap();
        c.set_reference_time(0.5);
        c.step().unwrap();
        assert_eq!(c.time(), 10.5);
    }

    #[test]
    fn acceleration_scales_reference_time() {
        let mut c = started(1.0);
        c.set_acceleration(4.0).unwrap();
        c.set_reference_time(0.25);
        assert_eq!(c.elapsed(), 1.0);
        c.step().unwrap();
        assert_eq!(c.time(), 1.0);
    }

    #[test]
    fn rejects_bad_acceleration() {
        let mut c = SynchronizedClock::new(1.0).unwrap();
        assert!(c.set_acceleration(0.0).is_err());
        assert!(c.set_acceleration(-2.0).is_err());
        assert!(c.set_acceleration(f64::NAN).is_err());
        assert_eq!(c.acceleration(), 1.0);
    }

    #[test]
    fn elapsed_is_measured_from_start() {
        let mut c = SynchronizedClock::new(1.0).unwrap();
        c.set_poll_interval(Duration::ZERO);
        c.set_reference_time(5.0);
        c.start().unwrap();
        assert_eq!(c.elapsed(), 0.0);
        c.set_reference_time(6.0);
        c.step().unwrap();
        assert_eq!(c.time(), 1.0);
    }

    #[test]
    fn reset_clears_step_count_and_reference() {
        let mut c = started(0.1);
        c.set_reference_time(1.0);
        c.step().unwrap();
        c.stop().unwrap();
        c.reset();
        assert_eq!(c.steps(), 0);
        assert_eq!(c.time(), 0.0);
        assert_eq!(c.reference_time(), 0.0);
    }

    #[test]
    fn take_writer_hands_over_production() {
        let mut c = started(0.01);
        let writer = c.take_writer().unwrap();
        assert!(c.take_writer().is_none());
        assert!(!c.set_reference_time(1.0));

        let done = Arc::new(AtomicBool::new(false));
        let producer_done = Arc::clone(&done);
        let producer = thread::spawn(move || {
            let mut t = 0.0;
            while !producer_done.load(Ordering::Acquire) {
                t += 0.005;
                writer.publish(t);
                thread::sleep(Duration::from_micros(50));
            }
        });

        for _ in 0..20 {
            c.step().unwrap();
        }
        done.store(true, Ordering::Release);
        producer.join().unwrap();

        assert_eq!(c.steps(), 20);
        assert!((c.time() - 0.2).abs() < 1e-12);
        assert!(c.elapsed() + 1e-12 >= 0.2);
    }
}
