//! Simulation configuration and validation.
//!
//! [`SimulationConfig`] is the input to [`Simulation::new`](crate::Simulation::new).
//! [`validate()`](SimulationConfig::validate) checks every field up
//! front, so a rejected configuration never half-builds a loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── SimulationConfig ───────────────────────────────────────────────

/// Parameters of a simulation run.
///
/// Every field has a default, so partial JSON documents deserialize:
///
/// ```
/// use simloop_engine::SimulationConfig;
///
/// let cfg: SimulationConfig =
///     serde_json::from_str(r#"{ "step_size": 0.1, "end_time": 5.0 }"#).unwrap();
/// assert_eq!(cfg.step_size, 0.1);
/// assert_eq!(cfg.end_time, Some(5.0));
/// assert!(!cfg.real_time);
/// cfg.validate().unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation time advanced per pass. Default: 0.01.
    pub step_size: f64,
    /// Clock time at initialize. Default: 0.
    pub start_time: f64,
    /// End the run once this time is reached. Default: run until stopped.
    pub end_time: Option<f64>,
    /// Pace passes against wall-clock time. Default: false.
    pub real_time: bool,
    /// Simulated seconds per wall-clock second when `real_time`. Default: 1.
    pub acceleration: f64,
    /// How long a paced step sleeps between checks, in microseconds.
    /// Zero yields instead of sleeping. Default: 10.
    pub poll_interval_us: u64,
    /// Log the simulation time at this cadence. Default: no reports.
    pub report_interval: Option<f64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            step_size: 0.01,
            start_time: 0.0,
            end_time: None,
            real_time: false,
            acceleration: 1.0,
            poll_interval_us: 10,
            report_interval: None,
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl SimulationConfig {
    /// Check every field, reporting the first invalid one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.step_size) {
            return Err(ConfigError::InvalidStepSize {
                value: self.step_size,
            });
        }
        if !self.start_time.is_finite() {
            return Err(ConfigError::InvalidStartTime {
                value: self.start_time,
            });
        }
        if let Some(end) = self.end_time {
            if !end.is_finite() || end < self.start_time {
                return Err(ConfigError::InvalidEndTime {
                    start: self.start_time,
                    end,
                });
            }
        }
        if !positive(self.acceleration) {
            return Err(ConfigError::InvalidAcceleration {
                value: self.acceleration,
            });
        }
        if let Some(interval) = self.report_interval {
            if !positive(interval) {
                return Err(ConfigError::InvalidReportInterval { value: interval });
            }
        }
        Ok(())
    }

    /// `poll_interval_us` as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }
}
