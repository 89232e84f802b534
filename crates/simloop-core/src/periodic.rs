//! Fixed-cadence lifecycle wrapper.
//!
//! [`Periodic`] turns a [`PeriodicComponent`] into a [`Component`] that
//! runs every `time_step_size` seconds of simulation time, offset by a
//! phase. The next execution instant is advanced by exactly one step per
//! execution and never resynchronized to the observed time, so long runs
//! stay on the exact grid `init + phase + k * step`.

use crate::error::{ComponentError, SetupError};
use crate::time::EPS_SIM_TIME;
use crate::traits::{Component, PeriodicComponent};

/// Periodic execution wrapper around a [`PeriodicComponent`].
///
/// # Examples
///
/// ```
/// use simloop_core::{Component, ComponentError, Periodic, PeriodicComponent};
///
/// #[derive(Default)]
/// struct Sampler { dts: Vec<f64> }
///
/// impl PeriodicComponent for Sampler {
///     fn init(&mut self, _t: f64) -> Result<(), ComponentError> { Ok(()) }
///     fn step(&mut self, _t: f64, dt: f64) -> Result<(), ComponentError> {
///         self.dts.push(dt);
///         Ok(())
///     }
///     fn terminate(&mut self, _t: f64) -> Result<(), ComponentError> { Ok(()) }
/// }
///
/// let mut p = Periodic::new(Sampler::default(), 0.5);
/// p.init(0.0).unwrap();
/// for i in 0..4 {
///     let t = i as f64 * 0.25;
///     if p.exec_condition(t) {
///         p.exec(t).unwrap();
///     }
/// }
/// assert_eq!(p.inner().dts, vec![0.0, 0.5]);
/// assert_eq!(p.steps(), 2);
/// ```
#[derive(Debug)]
pub struct Periodic<P> {
    inner: P,
    time_step_size: f64,
    phase_offset: f64,
    next_exec_time: f64,
    last_exec_time: f64,
    init_time: f64,
    term_time: f64,
    steps: u64,
}

impl<P: PeriodicComponent> Periodic<P> {
    /// Wrap `inner`, executing every `time_step_size` with no phase offset.
    ///
    /// The step size is validated at `init`, not here, so a wrapper can be
    /// built first and configured later.
    pub fn new(inner: P, time_step_size: f64) -> Self {
        Self {
            inner,
            time_step_size,
            phase_offset: 0.0,
            next_exec_time: 0.0,
            last_exec_time: 0.0,
            init_time: 0.0,
            term_time: f64::NEG_INFINITY,
            steps: 0,
        }
    }

    /// Builder form of [`configure`](Periodic::configure)'s phase offset.
    pub fn with_phase_offset(mut self, phase_offset: f64) -> Self {
        self.phase_offset = phase_offset;
        self
    }

    /// Set the cadence and the delay of the first execution after init.
    pub fn configure(&mut self, time_step_size: f64, phase_offset: f64) {
        self.time_step_size = time_step_size;
        self.phase_offset = phase_offset;
    }

    /// Configured cadence.
    pub fn time_step_size(&self) -> f64 {
        self.time_step_size
    }

    /// Configured phase offset.
    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    /// Simulation time of the next scheduled execution.
    pub fn next_exec_time(&self) -> f64 {
        self.next_exec_time
    }

    /// Simulation time of the last execution (or of init).
    pub fn last_exec_time(&self) -> f64 {
        self.last_exec_time
    }

    /// Executions since the last init.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Time passed to the last init.
    pub fn init_time(&self) -> f64 {
        self.init_time
    }

    /// Time passed to the last terminate, `-inf` while not terminated.
    pub fn term_time(&self) -> f64 {
        self.term_time
    }

    /// The wrapped component.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The wrapped component, mutably.
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }

    /// Unwrap.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: PeriodicComponent> Component for Periodic<P> {
    fn init(&mut self, time: f64) -> Result<(), ComponentError> {
        if !self.time_step_size.is_finite() || self.time_step_size < EPS_SIM_TIME {
            return Err(SetupError::InvalidStepSize {
                value: self.time_step_size,
            }
            .into());
        }

        self.steps = 0;
        self.init_time = time;
        self.term_time = f64::NEG_INFINITY;
        self.last_exec_time = time;
        self.next_exec_time = time + self.phase_offset;

        self.inner.init(time)
    }

    fn exec_condition(&self, time: f64) -> bool {
        time + EPS_SIM_TIME >= self.next_exec_time
    }

    fn exec(&mut self, time: f64) -> Result<(), ComponentError> {
        let dt = time - self.last_exec_time;
        self.last_exec_time = time;
        self.steps += 1;

        let result = self.inner.step(time, dt);
        self.next_exec_time += self.time_step_size;
        result
    }

    fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
        self.term_time = time;
        self.inner.terminate(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        inits: Vec<f64>,
        steps: Vec<(f64, f64)>,
        terms: Vec<f64>,
    }

    impl PeriodicComponent for Log {
        fn init(&mut self, time: f64) -> Result<(), ComponentError> {
            self.inits.push(time);
            Ok(())
        }

        fn step(&mut self, time: f64, delta_time: f64) -> Result<(), ComponentError> {
            self.steps.push((time, delta_time));
            Ok(())
        }

        fn terminate(&mut self, time: f64) -> Result<(), ComponentError> {
            self.terms.push(time);
            Ok(())
        }
    }

    fn drive(p: &mut Periodic<Log>, tick: f64, ticks: u32) {
        for i in 0..=ticks {
            let t = i as f64 * tick;
            if p.exec_condition(t) {
                p.exec(t).unwrap();
            }
        }
    }

    #[test]
    fn zero_step_size_is_a_setup_error() {
        let mut p = Periodic::new(Log::default(), 0.0);
        let err = p.init(0.0).unwrap_err();
        assert_eq!(
            err,
            ComponentError::Setup(SetupError::InvalidStepSize { value: 0.0 })
        );
        assert!(p.inner().inits.is_empty());
    }

    #[test]
    fn negative_and_nan_step_sizes_are_rejected() {
        assert!(Periodic::new(Log::default(), -1.0).init(0.0).is_err());
        assert!(Periodic::new(Log::default(), f64::NAN).init(0.0).is_err());
        assert!(Periodic::new(Log::default(), 1e-12).init(0.0).is_err());
    }

    #[test]
    fn init_schedules_first_exec_at_phase_offset() {
        let mut p = Periodic::new(Log::default(), 1.0).with_phase_offset(0.3);
        p.init(2.0).unwrap();
        assert_eq!(p.next_exec_time(), 2.3);
        assert_eq!(p.last_exec_time(), 2.0);
        assert!(!p.exec_condition(2.2));
        assert!(p.exec_condition(2.3));
        assert_eq!(p.inner().inits, vec![2.0]);
    }

    #[test]
    fn exec_condition_tolerates_epsilon() {
        let mut p = Periodic::new(Log::default(), 0.1);
        p.init(0.0).unwrap();
        p.exec(0.0).unwrap();
        // 0.1 reached via accumulated floating error just below the grid point.
        assert!(p.exec_condition(0.1 - EPS_SIM_TIME * 0.5));
        assert!(!p.exec_condition(0.1 - EPS_SIM_TIME * 2.0));
    }

    #[test]
    fn coarser_cadence_reports_actual_delta() {
        let mut p = Periodic::new(Log::default(), 0.5);
        p.init(0.0).unwrap();
        drive(&mut p, 0.25, 8);
        let times: Vec<f64> = p.inner().steps.iter().map(|s| s.0).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(p.inner().steps[0].1, 0.0);
        for &(_, dt) in &p.inner().steps[1..] {
            assert!((dt - 0.5).abs() < 1e-12);
        }
        assert_eq!(p.steps(), 5);
    }

    #[test]
    fn next_exec_time_is_not_resynchronized() {
        // Ticks at 0.3 with cadence 0.25: executions happen late, but the
        // schedule stays on multiples of 0.25.
        let mut p = Periodic::new(Log::default(), 0.25);
        p.init(0.0).unwrap();
        drive(&mut p, 0.3, 3);
        // t = 0.0, 0.3, 0.6, 0.9 → executes at every tick (each tick is past due).
        assert_eq!(p.steps(), 4);
        assert!((p.next_exec_time() - 1.0).abs() < 1e-12);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn matching_cadence_executes_every_tick(
                step in 1e-3f64..10.0,
                phase_ticks in 0u32..5,
                ticks in 1u32..300,
            ) {
                let phase = phase_ticks as f64 * step;
                let mut p = Periodic::new(Log::default(), step).with_phase_offset(phase);
                p.init(0.0).unwrap();

                let mut t = 0.0;
                for _ in 0..ticks {
                    if p.exec_condition(t) {
                        p.exec(t).unwrap();
                    }
                    t += step;
                }

                let expected = ticks.saturating_sub(phase_ticks) as u64;
                prop_assert_eq!(p.steps(), expected);
                for &(_, dt) in p.inner().steps.iter().skip(1) {
                    prop_assert!((dt - step).abs() < 1e-6 * step.max(1.0));
                }
            }
        }
    }

    #[test]
    fn reinit_resets_counters() {
        let mut p = Periodic::new(Log::default(), 1.0);
        p.init(0.0).unwrap();
        drive(&mut p, 1.0, 3);
        p.terminate(3.0).unwrap();
        assert_eq!(p.term_time(), 3.0);

        p.init(10.0).unwrap();
        assert_eq!(p.steps(), 0);
        assert_eq!(p.init_time(), 10.0);
        assert_eq!(p.term_time(), f64::NEG_INFINITY);
        assert_eq!(p.next_exec_time(), 10.0);
    }
}
