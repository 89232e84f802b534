//! Time tolerances shared by the scheduler and its components.

/// Tolerance for "is it time yet" comparisons on simulation time.
///
/// Used by [`Periodic`](crate::Periodic) (`t + EPS >= next`) and by the
/// deadline stop condition. Never applied to schedule increments.
pub const EPS_SIM_TIME: f64 = 1e-9;

/// Tolerance for abscissa comparisons on piecewise-linear curves.
pub const EPS_DISTANCE: f64 = 1e-9;

/// Whether `time` has reached `target` within [`EPS_SIM_TIME`].
#[inline]
pub fn reached(time: f64, target: f64) -> bool {
    time + EPS_SIM_TIME >= target
}
