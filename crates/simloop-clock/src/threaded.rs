//! Synchronized clock paced by a background producer thread.
//!
//! A [`ThreadedClock`] owns a [`SynchronizedClock`] and a [`TimeSource`].
//! `start()` moves the source and the reference-time writer into one
//! worker thread that polls the source and publishes what it returns.
//! `stop()` raises the shutdown flag, unparks and joins the worker, and
//! takes the source and writer back, so the worker's lifetime is at most
//! `start()..stop()`. A worker that ends early, because its source closed
//! or panicked, is reaped by the next `step()` that cannot be satisfied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use simloop_core::{Clock, ClockError, SetupError};
use tracing::{debug, warn};

use crate::reference::ReferenceTimeWriter;
use crate::synchronized::{SynchronizedClock, DEFAULT_POLL_INTERVAL};

/// Producer of reference time, polled from the clock's worker thread.
pub trait TimeSource: Send + 'static {
    /// Called once on the worker thread before the first poll.
    fn begin(&mut self) {}

    /// The newest reference time, or `None` if nothing new is available.
    fn poll(&mut self) -> Option<f64>;

    /// Whether the source will never produce again. The worker exits
    /// after the poll that first reports it.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Wall-clock seconds elapsed since the worker started.
#[derive(Debug, Default)]
pub struct WallClock {
    origin: Option<Instant>,
}

impl WallClock {
    /// A wall clock that starts counting at `begin()`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimeSource for WallClock {
    fn begin(&mut self) {
        self.origin = Some(Instant::now());
    }

    fn poll(&mut self) -> Option<f64> {
        let origin = *self.origin.get_or_insert_with(Instant::now);
        Some(origin.elapsed().as_secs_f64())
    }
}

/// Reference time received from another party over a channel.
///
/// Stands in for a remote peer: each received value is one time update.
/// When several updates are queued, only the newest is published. Once
/// every sender is dropped and the queue is drained, the source is closed.
#[derive(Debug)]
pub struct ChannelTimeSource {
    rx: Receiver<f64>,
    closed: bool,
}

impl ChannelTimeSource {
    /// Wrap the receiving end of a time-update channel.
    pub fn new(rx: Receiver<f64>) -> Self {
        Self { rx, closed: false }
    }
}

impl TimeSource for ChannelTimeSource {
    fn poll(&mut self) -> Option<f64> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(t) => latest = Some(t),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        latest
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Synchronized clock whose reference time is produced by a worker thread.
#[derive(Debug)]
pub struct ThreadedClock<S: TimeSource> {
    sync: SynchronizedClock,
    source: Option<S>,
    worker: Option<JoinHandle<(S, ReferenceTimeWriter)>>,
    halted: Option<ClockError>,
    shutdown: Arc<AtomicBool>,
    publish_interval: Duration,
}

/// Clock paced to wall-clock time (scaled by the acceleration factor).
pub type RealTimeClock = ThreadedClock<WallClock>;

impl ThreadedClock<WallClock> {
    /// A clock paced to the wall clock.
    ///
    /// # Examples
    ///
    /// ```
    /// use simloop_clock::RealTimeClock;
    /// use simloop_core::Clock;
    ///
    /// let mut clock = RealTimeClock::real_time(0.001).unwrap();
    /// clock.reset();
    /// clock.start().unwrap();
    /// clock.step().unwrap();
    /// clock.stop().unwrap();
    /// assert_eq!(clock.time(), 0.001);
    /// ```
    pub fn real_time(step_size: f64) -> Result<Self, SetupError> {
        Self::new(step_size, WallClock::new())
    }
}

impl<S: TimeSource> ThreadedClock<S> {
    /// Create a clock producing its reference time from `source`.
    pub fn new(step_size: f64, source: S) -> Result<Self, SetupError> {
        Ok(Self {
            sync: SynchronizedClock::new(step_size)?,
            source: Some(source),
            worker: None,
            halted: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            publish_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    /// Builder form of [`SynchronizedClock::set_start_time`].
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.sync.set_start_time(start_time);
        self
    }

    /// Builder form of [`SynchronizedClock::set_acceleration`].
    pub fn with_acceleration(mut self, acceleration: f64) -> Result<Self, SetupError> {
        self.sync.set_acceleration(acceleration)?;
        Ok(self)
    }

    /// Sleep between two publications on the worker, and between two
    /// reference polls inside `step()`.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.publish_interval = interval;
        self.sync.set_poll_interval(interval);
    }

    /// The wrapped synchronized clock.
    pub fn synchronized(&self) -> &SynchronizedClock {
        &self.sync
    }

    /// The time source, while no worker holds it.
    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Whether a worker thread is alive.
    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    fn spawn_worker(
        &mut self,
        mut source: S,
        writer: ReferenceTimeWriter,
    ) -> Result<JoinHandle<(S, ReferenceTimeWriter)>, ClockError> {
        let shutdown = Arc::clone(&self.shutdown);
        let interval = self.publish_interval;
        thread::Builder::new()
            .name("simloop-clock".into())
            .spawn(move || {
                source.begin();
                while !shutdown.load(Ordering::Acquire) {
                    if let Some(time) = source.poll() {
                        writer.publish(time);
                    }
                    if source.is_closed() {
                        debug!("time source closed");
                        break;
                    }
                    if interval.is_zero() {
                        thread::yield_now();
                    } else {
                        thread::park_timeout(interval);
                    }
                }
                (source, writer)
            })
            .map_err(|e| ClockError::ThreadSpawnFailed {
                reason: e.to_string(),
            })
    }

    /// Join the worker and take back what it held.
    fn join_worker(
        &mut self,
        handle: JoinHandle<(S, ReferenceTimeWriter)>,
    ) -> Result<(), ClockError> {
        match handle.join() {
            Ok((source, writer)) => {
                debug!("clock worker joined");
                self.source = Some(source);
                self.sync.restore_writer(writer);
                Ok(())
            }
            Err(_) => {
                warn!("clock worker panicked");
                self.sync.recover_writer();
                Err(ClockError::WorkerPanicked)
            }
        }
    }
}

impl<S: TimeSource> Clock for ThreadedClock<S> {
    fn time(&self) -> f64 {
        self.sync.time()
    }

    fn step_size(&self) -> f64 {
        self.sync.step_size()
    }

    fn reset(&mut self) {
        self.sync.reset();
    }

    fn start(&mut self) -> Result<(), ClockError> {
        if self.worker.is_some() || self.sync.is_running() {
            return Err(ClockError::AlreadyRunning);
        }
        let source = self.source.take().ok_or_else(|| ClockError::ThreadSpawnFailed {
            reason: "time source was lost by a failed worker".into(),
        })?;
        self.sync.recover_writer();
        self.sync.set_reference_time(0.0);
        if let Err(e) = self.sync.start() {
            self.source = Some(source);
            return Err(e);
        }

        let Some(writer) = self.sync.take_writer() else {
            self.source = Some(source);
            self.sync.stop()?;
            return Err(ClockError::ThreadSpawnFailed {
                reason: "reference-time writer unavailable".into(),
            });
        };

        self.shutdown.store(false, Ordering::Release);
        self.halted = None;
        match self.spawn_worker(source, writer) {
            Ok(handle) => {
                debug!("clock worker started");
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "clock worker failed to spawn");
                self.sync.recover_writer();
                self.sync.stop()?;
                Err(e)
            }
        }
    }

    /// Block until the worker's reference time reaches the next tick.
    ///
    /// Fails with [`ClockError::SourceClosed`] or
    /// [`ClockError::WorkerPanicked`] once the worker has ended short of
    /// the tick, and keeps failing the same way until the next `start()`.
    fn step(&mut self) -> Result<(), ClockError> {
        if let Some(halted) = &self.halted {
            return Err(halted.clone());
        }
        let worker = &self.worker;
        let ticked = self
            .sync
            .step_while(|| worker.as_ref().is_some_and(|h| !h.is_finished()))?;
        if ticked {
            return Ok(());
        }

        let halted = match self.worker.take() {
            Some(handle) => match self.join_worker(handle) {
                Ok(()) => ClockError::SourceClosed,
                Err(e) => e,
            },
            None => ClockError::SourceClosed,
        };
        warn!(error = %halted, "clock halted");
        self.halted = Some(halted.clone());
        Err(halted)
    }

    fn stop(&mut self) -> Result<(), ClockError> {
        let joined = match self.worker.take() {
            Some(handle) => {
                self.shutdown.store(true, Ordering::Release);
                handle.thread().unpark();
                self.join_worker(handle)
            }
            None => Ok(()),
        };
        self.sync.stop()?;
        joined
    }

    fn is_running(&self) -> bool {
        self.sync.is_running()
    }
}

impl<S: TimeSource> Drop for ThreadedClock<S> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}
