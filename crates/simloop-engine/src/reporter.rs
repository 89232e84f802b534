//! Periodic progress reporting.

use simloop_core::{ComponentError, Periodic, PeriodicComponent};
use tracing::info;

/// Cadence used by [`TimeReporter::periodic_default`].
pub const DEFAULT_REPORT_INTERVAL: f64 = 1.0;

/// Logs the simulation time at its own cadence.
#[derive(Clone, Debug, Default)]
pub struct TimeReporter {
    reports: u64,
}

impl TimeReporter {
    /// A reporter that has not reported yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A reporter wrapped to report every `interval`.
    pub fn periodic(interval: f64) -> Periodic<Self> {
        Periodic::new(Self::new(), interval)
    }

    /// A reporter wrapped to report every [`DEFAULT_REPORT_INTERVAL`].
    pub fn periodic_default() -> Periodic<Self> {
        Self::periodic(DEFAULT_REPORT_INTERVAL)
    }

    /// Reports since the last init.
    pub fn reports(&self) -> u64 {
        self.reports
    }
}

impl PeriodicComponent for TimeReporter {
    fn init(&mut self, _time: f64) -> Result<(), ComponentError> {
        self.reports = 0;
        Ok(())
    }

    fn step(&mut self, time: f64, _delta_time: f64) -> Result<(), ComponentError> {
        self.reports += 1;
        info!(time, "simulation time");
        Ok(())
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        info!(time, reports = self.reports, "simulation finished");
        Ok(())
    }
}
